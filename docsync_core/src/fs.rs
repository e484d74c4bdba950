use std::path::Path;

use crate::DocsyncError;
use crate::DocsyncResult;
use crate::logger::SharedLogger;

/// The parts of a file's metadata the engine looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
	pub is_dir: bool,
	pub is_file: bool,
	pub len: u64,
}

/// Filesystem capability consumed by the compiler, the include resolver and
/// source acquisition.
pub trait FsOps {
	fn exists(&self, path: &Path) -> bool;

	fn read_to_string(&self, path: &Path) -> DocsyncResult<String>;

	fn write(&self, path: &Path, content: &str) -> DocsyncResult<()>;

	/// Create `path` and its parents. Fails when `path` exists and is not a
	/// directory.
	fn ensure_dir(&self, path: &Path) -> DocsyncResult<()>;

	fn stat(&self, path: &Path) -> DocsyncResult<FileStat>;
}

/// Reads and writes through `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FsOps for RealFs {
	fn exists(&self, path: &Path) -> bool {
		path.exists()
	}

	fn read_to_string(&self, path: &Path) -> DocsyncResult<String> {
		read_real(path)
	}

	fn write(&self, path: &Path, content: &str) -> DocsyncResult<()> {
		std::fs::write(path, content).map_err(|e| {
			DocsyncError::Write {
				path: path.to_path_buf(),
				reason: e.to_string(),
			}
		})
	}

	fn ensure_dir(&self, path: &Path) -> DocsyncResult<()> {
		if path.exists() {
			if !stat_real(path)?.is_dir {
				return Err(DocsyncError::NotADirectory(path.to_path_buf()));
			}
			return Ok(());
		}

		std::fs::create_dir_all(path).map_err(|e| {
			DocsyncError::Write {
				path: path.to_path_buf(),
				reason: e.to_string(),
			}
		})
	}

	fn stat(&self, path: &Path) -> DocsyncResult<FileStat> {
		stat_real(path)
	}
}

/// Performs real reads so dependency discovery and error detection behave
/// exactly like a real run, but only logs writes and directory creation.
#[derive(Clone)]
pub struct DryRunFs {
	logger: SharedLogger,
}

impl DryRunFs {
	pub fn new(logger: SharedLogger) -> Self {
		Self { logger }
	}
}

impl FsOps for DryRunFs {
	fn exists(&self, path: &Path) -> bool {
		path.exists()
	}

	fn read_to_string(&self, path: &Path) -> DocsyncResult<String> {
		read_real(path)
	}

	fn write(&self, path: &Path, content: &str) -> DocsyncResult<()> {
		self.logger
			.warn(&format!("[DRY-RUN] Would write file: {}", path.display()));
		self.logger.debug(&format!(
			"[DRY-RUN] Content length: {} characters",
			content.chars().count()
		));
		Ok(())
	}

	fn ensure_dir(&self, path: &Path) -> DocsyncResult<()> {
		self.logger.warn(&format!(
			"[DRY-RUN] Would create directory: {}",
			path.display()
		));
		Ok(())
	}

	fn stat(&self, path: &Path) -> DocsyncResult<FileStat> {
		stat_real(path)
	}
}

fn read_real(path: &Path) -> DocsyncResult<String> {
	std::fs::read_to_string(path).map_err(|e| {
		DocsyncError::Read {
			path: path.to_path_buf(),
			reason: e.to_string(),
		}
	})
}

fn stat_real(path: &Path) -> DocsyncResult<FileStat> {
	let metadata = std::fs::metadata(path).map_err(|e| {
		DocsyncError::Read {
			path: path.to_path_buf(),
			reason: e.to_string(),
		}
	})?;

	Ok(FileStat {
		is_dir: metadata.is_dir(),
		is_file: metadata.is_file(),
		len: metadata.len(),
	})
}

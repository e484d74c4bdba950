use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::DocsyncConfig;
use crate::DocsyncError;
use crate::DocsyncResult;
use crate::FileStat;
use crate::FsOps;
use crate::Logger;
use crate::Mapping;
use crate::SourceDirs;

/// In-memory filesystem. Directories are implied by the files they hold.
#[derive(Debug, Default)]
pub struct MemoryFs {
	files: RefCell<BTreeMap<PathBuf, String>>,
	dirs: RefCell<BTreeSet<PathBuf>>,
	unreadable: BTreeSet<PathBuf>,
	reads: RefCell<Vec<PathBuf>>,
	writes: RefCell<Vec<PathBuf>>,
}

impl MemoryFs {
	pub fn new(files: &[(&str, &str)]) -> Self {
		let fs = Self::default();
		for (path, content) in files {
			fs.files
				.borrow_mut()
				.insert(PathBuf::from(path), (*content).to_string());
		}
		fs
	}

	/// The file exists but every read fails.
	#[must_use]
	pub fn with_unreadable(mut self, path: &str) -> Self {
		self.files
			.borrow_mut()
			.insert(PathBuf::from(path), String::new());
		self.unreadable.insert(PathBuf::from(path));
		self
	}

	pub fn set(&self, path: &str, content: &str) {
		self.files
			.borrow_mut()
			.insert(PathBuf::from(path), content.to_string());
	}

	pub fn get(&self, path: &str) -> Option<String> {
		self.files.borrow().get(Path::new(path)).cloned()
	}

	pub fn reads(&self) -> Vec<PathBuf> {
		self.reads.borrow().clone()
	}

	pub fn writes(&self) -> Vec<PathBuf> {
		self.writes.borrow().clone()
	}

	fn is_dir(&self, path: &Path) -> bool {
		self.dirs.borrow().contains(path)
			|| self
				.files
				.borrow()
				.keys()
				.any(|file| file != path && file.starts_with(path))
	}
}

impl FsOps for MemoryFs {
	fn exists(&self, path: &Path) -> bool {
		self.files.borrow().contains_key(path) || self.is_dir(path)
	}

	fn read_to_string(&self, path: &Path) -> DocsyncResult<String> {
		self.reads.borrow_mut().push(path.to_path_buf());

		if self.unreadable.contains(path) {
			return Err(DocsyncError::Read {
				path: path.to_path_buf(),
				reason: "permission denied".to_string(),
			});
		}

		self.files.borrow().get(path).cloned().ok_or_else(|| {
			DocsyncError::Read {
				path: path.to_path_buf(),
				reason: "no such file".to_string(),
			}
		})
	}

	fn write(&self, path: &Path, content: &str) -> DocsyncResult<()> {
		self.writes.borrow_mut().push(path.to_path_buf());
		self.files
			.borrow_mut()
			.insert(path.to_path_buf(), content.to_string());
		Ok(())
	}

	fn ensure_dir(&self, path: &Path) -> DocsyncResult<()> {
		if self.files.borrow().contains_key(path) {
			return Err(DocsyncError::NotADirectory(path.to_path_buf()));
		}

		self.dirs.borrow_mut().insert(path.to_path_buf());
		Ok(())
	}

	fn stat(&self, path: &Path) -> DocsyncResult<FileStat> {
		if let Some(content) = self.files.borrow().get(path) {
			return Ok(FileStat {
				is_dir: false,
				is_file: true,
				len: content.len() as u64,
			});
		}

		if self.is_dir(path) {
			return Ok(FileStat {
				is_dir: true,
				is_file: false,
				len: 0,
			});
		}

		Err(DocsyncError::Read {
			path: path.to_path_buf(),
			reason: "no such file".to_string(),
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
	Info,
	Success,
	Warn,
	Error,
	Debug,
}

/// Keeps every message for later assertions.
#[derive(Debug, Default)]
pub struct RecordingLogger {
	messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
	pub fn shared() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn messages(&self, level: Level) -> Vec<String> {
		self.messages
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.filter(|(recorded, _)| *recorded == level)
			.map(|(_, message)| message.clone())
			.collect()
	}

	pub fn contains(&self, level: Level, needle: &str) -> bool {
		self.messages(level)
			.iter()
			.any(|message| message.contains(needle))
	}

	fn record(&self, level: Level, message: &str) {
		self.messages
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push((level, message.to_string()));
	}
}

impl Logger for RecordingLogger {
	fn info(&self, message: &str) {
		self.record(Level::Info, message);
	}

	fn success(&self, message: &str) {
		self.record(Level::Success, message);
	}

	fn warn(&self, message: &str) {
		self.record(Level::Warn, message);
	}

	fn error(&self, message: &str) {
		self.record(Level::Error, message);
	}

	fn debug(&self, message: &str) {
		self.record(Level::Debug, message);
	}
}

/// `common` and `docs1` rooted under `/src`.
pub fn memory_sources() -> SourceDirs {
	[
		("common".to_string(), PathBuf::from("/src/common")),
		("docs1".to_string(), PathBuf::from("/src/docs1")),
	]
	.into_iter()
	.collect()
}

pub fn config_with(site: &str, mappings: Vec<Mapping>) -> DocsyncConfig {
	DocsyncConfig {
		site: site.to_string(),
		cache_dir: PathBuf::from(".docsync-cache"),
		sources: BTreeMap::new(),
		mappings,
		dry_run: false,
	}
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create dir: {e}"));
	}
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
}

pub fn read_file(path: &Path) -> String {
	std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// A temporary project with `sources/common`, `sources/docs1` and an `out`
/// directory for compiled output. Paths are canonical so they match watch
/// events.
pub struct TempProject {
	pub dir: tempfile::TempDir,
	pub root: PathBuf,
}

impl TempProject {
	pub fn new() -> Self {
		let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
		let root = dir
			.path()
			.canonicalize()
			.unwrap_or_else(|e| panic!("canonicalize: {e}"));

		for source in ["common", "docs1"] {
			std::fs::create_dir_all(root.join("sources").join(source))
				.unwrap_or_else(|e| panic!("create source: {e}"));
		}

		Self { dir, root }
	}

	pub fn source(&self, key: &str) -> PathBuf {
		self.root.join("sources").join(key)
	}

	pub fn write_source(&self, key: &str, relative: &str, content: &str) {
		write_file(&self.source(key), relative, content);
	}

	pub fn sources(&self) -> SourceDirs {
		["common", "docs1"]
			.into_iter()
			.map(|key| (key.to_string(), self.source(key)))
			.collect()
	}

	pub fn output(&self, relative: &str) -> String {
		read_file(&self.root.join(relative))
	}
}

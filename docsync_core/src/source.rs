use std::collections::BTreeMap;
use std::fmt;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use derive_more::Deref;
use derive_more::DerefMut;

use crate::DocsyncError;
use crate::DocsyncResult;
use crate::config::SourceConfig;
use crate::fs::FsOps;
use crate::logger::Logger;

/// Names a file inside a configured source: `<key>:<relative path>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId {
	pub key: String,
	pub path: String,
}

impl SourceId {
	pub fn new(key: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			path: path.into(),
		}
	}

	/// Split at the first `:`. Both halves must be non-empty.
	pub fn parse(id: &str) -> DocsyncResult<Self> {
		match id.split_once(':') {
			Some((key, path)) if !key.is_empty() && !path.is_empty() => Ok(Self::new(key, path)),
			_ => Err(DocsyncError::InvalidSourceId(id.to_string())),
		}
	}
}

impl fmt::Display for SourceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.key, self.path)
	}
}

/// Source key to resolved base directory, produced by source acquisition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct SourceDirs(
	#[deref]
	#[deref_mut]
	BTreeMap<String, PathBuf>,
);

impl SourceDirs {
	pub fn new() -> Self {
		Self::default()
	}

	/// The on-disk path of `id`, or `None` when its source is unknown.
	pub fn resolve(&self, id: &SourceId) -> Option<PathBuf> {
		self.get(&id.key).map(|base| base.join(&id.path))
	}

	/// Find the source owning `path` by the longest matching base directory.
	/// The relative part is rendered with `/` separators.
	pub fn owning_source(&self, path: &Path) -> Option<SourceId> {
		self.iter()
			.filter_map(|(key, base)| {
				let relative = path.strip_prefix(base).ok()?;
				Some((key, base.components().count(), relative))
			})
			.max_by_key(|(_, depth, _)| *depth)
			.and_then(|(key, _, relative)| {
				let parts: Vec<String> = relative
					.components()
					.filter_map(|component| {
						match component {
							Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
							_ => None,
						}
					})
					.collect();

				if parts.is_empty() {
					return None;
				}

				Some(SourceId::new(key.clone(), parts.join("/")))
			})
	}
}

impl FromIterator<(String, PathBuf)> for SourceDirs {
	fn from_iter<T: IntoIterator<Item = (String, PathBuf)>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

/// Local sources are absolute paths or paths starting with `./` or `../`.
pub fn is_local_repo(repo: &str) -> bool {
	repo.starts_with('/')
		|| repo.starts_with("./")
		|| repo.starts_with("../")
		|| Path::new(repo).is_absolute()
}

/// Make a source available on disk and return its base directory.
///
/// Local sources are used in place. Git sources are cloned into
/// `cache_dir/<key>` on first use and pulled afterwards. Every failure is
/// fatal for the run.
pub fn prepare_repo(
	key: &str,
	source: &SourceConfig,
	cache_dir: &Path,
	root: &Path,
	fs: &dyn FsOps,
	logger: &dyn Logger,
) -> DocsyncResult<PathBuf> {
	if is_local_repo(&source.repo) {
		let path = root.join(&source.repo);

		if !fs.exists(&path) {
			logger.error(&format!("Local path does not exist: {}", path.display()));
			return Err(DocsyncError::LocalSourceMissing {
				key: key.to_string(),
				path,
			});
		}

		// Watch events arrive with canonical paths.
		let path = path.canonicalize().unwrap_or(path);
		logger.info(&format!("Using local source: {key} -> {}", path.display()));
		return Ok(path);
	}

	let Some(branch) = source.branch.as_deref() else {
		logger.error(&format!("Branch is required for git repository: {key}"));
		return Err(DocsyncError::MissingBranch(key.to_string()));
	};

	let dir = cache_dir.join(key);

	if fs.exists(&dir) {
		logger.info(&format!("Updating {key}..."));
		run_git(key, Command::new("git").arg("-C").arg(&dir).arg("pull"), logger)?;
		logger.success(&format!("Updated {key}"));
	} else {
		logger.info(&format!("Cloning {key} from {}...", source.repo));
		run_git(
			key,
			Command::new("git")
				.arg("clone")
				.arg("-b")
				.arg(branch)
				.arg(&source.repo)
				.arg(&dir),
			logger,
		)?;
		logger.success(&format!("Cloned {key}"));
	}

	Ok(dir)
}

fn run_git(key: &str, command: &mut Command, logger: &dyn Logger) -> DocsyncResult<()> {
	let output = command.output().map_err(|e| {
		DocsyncError::Git {
			key: key.to_string(),
			reason: e.to_string(),
		}
	})?;

	if output.status.success() {
		return Ok(());
	}

	let stderr = String::from_utf8_lossy(&output.stderr);
	let reason = format!("git exited with {}: {}", output.status, stderr.trim());
	logger.error(&format!("Failed to prepare repo {key}: {reason}"));

	Err(DocsyncError::Git {
		key: key.to_string(),
		reason,
	})
}

/// Prepare every configured source in key order. The first failure aborts.
pub fn prepare_sources(
	sources: &BTreeMap<String, SourceConfig>,
	cache_dir: &Path,
	root: &Path,
	fs: &dyn FsOps,
	logger: &dyn Logger,
) -> DocsyncResult<SourceDirs> {
	let mut dirs = SourceDirs::new();

	for (key, source) in sources {
		let dir = prepare_repo(key, source, cache_dir, root, fs, logger)?;
		dirs.insert(key.clone(), dir);
	}

	Ok(dirs)
}

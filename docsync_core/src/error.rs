use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DocsyncError {
	#[error(transparent)]
	#[diagnostic(code(docsync::io_error))]
	Io(#[from] std::io::Error),

	#[error("no config file found in `{}`", .0.display())]
	#[diagnostic(
		code(docsync::config_not_found),
		help("create a `docsync.toml` or pass `--config <file>`")
	)]
	ConfigNotFound(PathBuf),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(docsync::config_parse),
		help("check that the config is valid TOML with `site`, `[sources]` and `[[mappings]]`")
	)]
	ConfigParse(String),

	#[error("invalid source identifier: `{0}`")]
	#[diagnostic(
		code(docsync::invalid_source_id),
		help("source identifiers have the form `<source>:<relative/path.md>`")
	)]
	InvalidSourceId(String),

	#[error("unknown source `{key}` referenced by `{id}`")]
	#[diagnostic(
		code(docsync::unknown_source),
		help("declare `[sources.{key}]` in the config file")
	)]
	UnknownSource { key: String, id: String },

	#[error("source file not found: `{id}` ({})", path.display())]
	#[diagnostic(code(docsync::source_file_not_found))]
	SourceFileNotFound { id: String, path: PathBuf },

	#[error("failed to read `{}`: {reason}", path.display())]
	#[diagnostic(code(docsync::read))]
	Read { path: PathBuf, reason: String },

	#[error("failed to write `{}`: {reason}", path.display())]
	#[diagnostic(code(docsync::write))]
	Write { path: PathBuf, reason: String },

	#[error("not a directory: `{}`", .0.display())]
	#[diagnostic(
		code(docsync::not_a_directory),
		help("remove the file that is in the way of the output directory")
	)]
	NotADirectory(PathBuf),

	#[error("branch is required for git source `{0}`")]
	#[diagnostic(
		code(docsync::missing_branch),
		help("add `branch = \"main\"` (or another branch) to `[sources.{0}]`")
	)]
	MissingBranch(String),

	#[error("local path for source `{key}` does not exist: `{}`", path.display())]
	#[diagnostic(code(docsync::local_source_missing))]
	LocalSourceMissing { key: String, path: PathBuf },

	#[error("failed to prepare source `{key}`: {reason}")]
	#[diagnostic(code(docsync::git))]
	Git { key: String, reason: String },

	#[error("all {} mapping(s) failed to compile", failed.len())]
	#[diagnostic(
		code(docsync::all_mappings_failed),
		help("run with `--debug` to see why each mapping failed")
	)]
	AllMappingsFailed { failed: Vec<String> },
}

impl DocsyncError {
	/// Errors raised while acquiring a source. These abort the whole run.
	pub fn is_fatal_source_error(&self) -> bool {
		matches!(
			self,
			Self::MissingBranch(_) | Self::LocalSourceMissing { .. } | Self::Git { .. }
		)
	}
}

pub type DocsyncResult<T> = Result<T, DocsyncError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;

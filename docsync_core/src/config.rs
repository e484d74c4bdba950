use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::DocsyncError;
use crate::DocsyncResult;

/// Default checkout directory for git sources, relative to the project root.
pub const DEFAULT_CACHE_DIR: &str = ".docsync-cache";

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"docsync.toml",
	".docsync.toml",
	".config/docsync.toml",
];

/// A named origin of markdown fragments.
///
/// `repo` is either a git remote (which requires `branch`) or a local path
/// starting with `/`, `./` or `../`.
///
/// ```toml
/// [sources.common]
/// repo = "ssh://git@example.com/docs-common.git"
/// branch = "main"
///
/// [sources.local]
/// repo = "../docs-local"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
	pub repo: String,
	#[serde(default)]
	pub branch: Option<String>,
}

/// Projects one source file onto one output path.
#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Mapping {
	/// Source identifier, `<source>:<relative/path.md>`.
	pub from: String,
	/// Destination path. Relative paths resolve against the project root.
	pub to: PathBuf,
}

impl Mapping {
	pub fn new(from: impl Into<String>, to: impl Into<PathBuf>) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
		}
	}
}

/// Configuration loaded from a `docsync.toml` file.
///
/// ```toml
/// site = "site-a"
/// cache_dir = ".docsync-cache"
/// dry_run = false
///
/// [sources.common]
/// repo = "ssh://git@example.com/docs-common.git"
/// branch = "main"
///
/// [[mappings]]
/// from = "common:guides/install.md"
/// to = "output/site-a/guides/install.md"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DocsyncConfig {
	/// The active site. `@site` blocks are evaluated against it.
	pub site: String,
	/// Where git sources are cloned. Defaults to `.docsync-cache`.
	#[serde(default = "default_cache_dir")]
	pub cache_dir: PathBuf,
	/// Source key to source definition.
	#[serde(default)]
	pub sources: BTreeMap<String, SourceConfig>,
	/// Compiled in the order they are declared.
	#[serde(default)]
	pub mappings: Vec<Mapping>,
	/// Perform every read but skip writes.
	#[serde(default)]
	pub dry_run: bool,
}

fn default_cache_dir() -> PathBuf {
	PathBuf::from(DEFAULT_CACHE_DIR)
}

impl DocsyncConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no candidate exists.
	pub fn load(root: &Path) -> DocsyncResult<Option<DocsyncConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_from(&config_path).map(Some)
	}

	/// Load the config from an explicit file.
	pub fn load_from(path: &Path) -> DocsyncResult<DocsyncConfig> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	pub fn from_toml_str(content: &str) -> DocsyncResult<DocsyncConfig> {
		let config: DocsyncConfig =
			toml::from_str(content).map_err(|e| DocsyncError::ConfigParse(e.to_string()))?;
		config.validate()?;

		Ok(config)
	}

	fn validate(&self) -> DocsyncResult<()> {
		if self.site.trim().is_empty() {
			return Err(DocsyncError::ConfigParse(
				"`site` must not be empty".to_string(),
			));
		}

		Ok(())
	}

	/// The cache directory resolved against `root`.
	pub fn cache_dir_in(&self, root: &Path) -> PathBuf {
		root.join(&self.cache_dir)
	}
}

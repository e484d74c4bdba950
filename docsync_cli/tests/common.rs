#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use docsync_core::AnyEmptyResult;
use docsync_core::AnyResult;
use tempfile::TempDir;

/// Two local sources and one mapping that pulls a shared fragment.
pub const CONFIG: &str = r#"site = "site-a"

[sources.common]
repo = "./sources/common"

[sources.docs1]
repo = "./sources/docs1"

[[mappings]]
from = "docs1:guide.md"
to = "out/guide.md"
"#;

pub const GUIDE: &str = concat!(
	"# Guide\n\n",
	"<!-- @include common:warning.md -->\n\n",
	"<!-- @site site-a -->\nOnly on A.\n<!-- @endsite -->\n",
	"<!-- @site !site-a -->\nNot on A.\n<!-- @endsite -->\n",
);

pub const WARNING: &str = "> Read this first.\n";

pub fn docsync_cmd() -> Command {
	let mut cmd =
		Command::cargo_bin("docsync").unwrap_or_else(|e| panic!("docsync binary missing: {e}"));
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}

/// A temporary project root holding a config file and local sources.
pub struct Project {
	pub dir: TempDir,
}

impl Project {
	pub fn new(config: &str) -> AnyResult<Self> {
		let project = Self {
			dir: tempfile::tempdir()?,
		};
		project.write("docsync.toml", config)?;
		std::fs::create_dir_all(project.path().join("sources/common"))?;
		std::fs::create_dir_all(project.path().join("sources/docs1"))?;

		Ok(project)
	}

	/// The default config with the guide and its shared warning in place.
	pub fn with_guide() -> AnyResult<Self> {
		let project = Self::new(CONFIG)?;
		project.write("sources/docs1/guide.md", GUIDE)?;
		project.write("sources/common/warning.md", WARNING)?;

		Ok(project)
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}

	pub fn write(&self, relative: &str, content: &str) -> AnyEmptyResult {
		let path = self.path().join(relative);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, content)?;

		Ok(())
	}

	pub fn read(&self, relative: &str) -> AnyResult<String> {
		Ok(std::fs::read_to_string(self.path().join(relative))?)
	}

	pub fn exists(&self, relative: &str) -> bool {
		self.path().join(relative).exists()
	}
}

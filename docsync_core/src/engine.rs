use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fmt;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::DocsyncError;
use crate::DocsyncResult;
use crate::compiler::CompileContext;
use crate::compiler::CompiledOutput;
use crate::compiler::compile_mapping;
use crate::compiler::delete_mapping;
use crate::config::DocsyncConfig;
use crate::config::Mapping;
use crate::fs::DryRunFs;
use crate::fs::FsOps;
use crate::fs::RealFs;
use crate::graph::DepGraph;
use crate::hash::ContentHash;
use crate::logger::SharedLogger;
use crate::source::SourceDirs;
use crate::source::SourceId;
use crate::source::prepare_sources;

/// A successfully compiled mapping, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledSummary {
	pub from: String,
	pub to: PathBuf,
	pub hash: ContentHash,
	pub dependencies: Vec<String>,
}

impl From<CompiledOutput> for CompiledSummary {
	fn from(output: CompiledOutput) -> Self {
		Self {
			from: output.from,
			to: output.to,
			hash: output.hash,
			dependencies: output.dependencies.into_iter().collect(),
		}
	}
}

/// A mapping that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingFailure {
	pub from: String,
	pub to: PathBuf,
	pub error: String,
}

/// Outcome of compiling a batch of mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
	pub attempted: usize,
	pub compiled: Vec<CompiledSummary>,
	pub failures: Vec<MappingFailure>,
	pub dry_run: bool,
}

impl SyncReport {
	pub fn succeeded(&self) -> usize {
		self.compiled.len()
	}

	pub fn failed(&self) -> usize {
		self.failures.len()
	}

	/// True when nothing failed.
	pub fn is_ok(&self) -> bool {
		self.failures.is_empty()
	}

	/// True when there was at least one mapping and none of them compiled.
	pub fn all_failed(&self) -> bool {
		self.attempted > 0 && self.compiled.is_empty()
	}

	/// The `from` identifiers of every failed mapping.
	pub fn failed_mappings(&self) -> Vec<String> {
		self.failures
			.iter()
			.map(|failure| failure.from.clone())
			.collect()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
	/// Created or modified.
	Changed,
	Deleted,
}

impl fmt::Display for FileEventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Changed => write!(f, "changed"),
			Self::Deleted => write!(f, "deleted"),
		}
	}
}

/// A single filesystem notification delivered to a watch session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
	pub path: PathBuf,
	pub kind: FileEventKind,
}

impl FileEvent {
	pub fn changed(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			kind: FileEventKind::Changed,
		}
	}

	pub fn deleted(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			kind: FileEventKind::Deleted,
		}
	}
}

/// What a watch session did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
	/// The path is outside every source or inside version control metadata.
	Ignored,
	Recompiled {
		/// Source identifier of the changed file.
		id: String,
		/// Everything the dependency graph reported as affected.
		affected: BTreeSet<String>,
		compiled: usize,
		failed: usize,
	},
}

/// A sync or watch run.
///
/// The session exclusively owns the dependency graph for its lifetime. All
/// compilation and every graph mutation happen through `&mut self`, one
/// event at a time.
pub struct Session {
	config: DocsyncConfig,
	root: PathBuf,
	sources: SourceDirs,
	graph: DepGraph,
	fs: Box<dyn FsOps>,
	logger: SharedLogger,
}

impl Session {
	/// Acquire every configured source and build a session around them.
	/// Acquisition failures are fatal.
	pub fn prepare(
		config: DocsyncConfig,
		root: impl Into<PathBuf>,
		logger: SharedLogger,
	) -> DocsyncResult<Self> {
		let root = root.into();
		let fs = default_fs(&config, &logger);

		logger.info(&format!("Syncing {} source(s)...", config.sources.len()));
		let cache_dir = config.cache_dir_in(&root);
		let sources = prepare_sources(
			&config.sources,
			&cache_dir,
			&root,
			fs.as_ref(),
			logger.as_ref(),
		)?;

		Ok(Self {
			config,
			root,
			sources,
			graph: DepGraph::new(),
			fs,
			logger,
		})
	}

	/// Build a session around sources that are already on disk.
	pub fn with_sources(
		config: DocsyncConfig,
		root: impl Into<PathBuf>,
		sources: SourceDirs,
		logger: SharedLogger,
	) -> Self {
		let fs = default_fs(&config, &logger);

		Self {
			config,
			root: root.into(),
			sources,
			graph: DepGraph::new(),
			fs,
			logger,
		}
	}

	/// Replace the filesystem capability.
	#[must_use]
	pub fn with_fs(mut self, fs: Box<dyn FsOps>) -> Self {
		self.fs = fs;
		self
	}

	pub fn config(&self) -> &DocsyncConfig {
		&self.config
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn sources(&self) -> &SourceDirs {
		&self.sources
	}

	pub fn graph(&self) -> &DepGraph {
		&self.graph
	}

	pub fn is_dry_run(&self) -> bool {
		self.config.dry_run
	}

	/// Compile every mapping in configuration order.
	///
	/// One mapping failing never stops the others. The run only fails when
	/// every mapping failed outside of dry-run mode.
	pub fn compile_all(&mut self) -> DocsyncResult<SyncReport> {
		self.logger.info(&format!(
			"Compiling {} mapping(s)...",
			self.config.mappings.len()
		));

		let report = self.compile_where(|_| true);

		if report.is_ok() {
			self.logger.success(&format!(
				"All {} mapping(s) compiled successfully",
				report.attempted
			));
			return Ok(report);
		}

		self.logger.warn(&format!(
			"Compiled {}/{} mapping(s), {} failed",
			report.succeeded(),
			report.attempted,
			report.failed()
		));

		self.logger.debug(&format!(
			"Failed mappings: {}",
			report.failed_mappings().join(", ")
		));

		if report.all_failed() && !self.config.dry_run {
			return Err(DocsyncError::AllMappingsFailed {
				failed: report.failed_mappings(),
			});
		}

		Ok(report)
	}

	/// Compile every mapping whose `from` equals `from`.
	pub fn compile_mapping_by_from(&mut self, from: &str) -> SyncReport {
		self.compile_where(|mapping| mapping.from == from)
	}

	/// Process one filesystem event to completion.
	///
	/// The owning source is found by the longest matching base directory.
	/// For a deletion, mappings whose source was the deleted file are removed
	/// from the graph first. Every mapping in `affected(id)` is then
	/// recompiled, along with the mapping whose own source changed, so a
	/// source that was deleted and recreated is picked up again.
	pub fn handle_event(&mut self, event: &FileEvent) -> WatchOutcome {
		if is_vcs_path(&event.path) {
			return WatchOutcome::Ignored;
		}

		let Some(id) = self.owning_source(&event.path) else {
			self.logger.debug(&format!(
				"Ignoring {} outside of every source",
				event.path.display()
			));
			return WatchOutcome::Ignored;
		};

		let id = id.to_string();
		self.logger.info(&format!("File {}: {id}", event.kind));

		if event.kind == FileEventKind::Deleted {
			for mapping in self.config.mappings.iter().filter(|m| m.from == id) {
				delete_mapping(mapping, &mut self.graph);
				self.logger
					.warn(&format!("Source of mapping {} was deleted", mapping.from));
			}
		}

		let mut affected = self.graph.affected(&id);

		// A recreated mapping source lost its edges when it was deleted.
		if event.kind == FileEventKind::Changed
			&& self.config.mappings.iter().any(|mapping| mapping.from == id)
		{
			affected.insert(id.clone());
		}

		if affected.is_empty() {
			self.logger.debug(&format!("Nothing depends on {id}"));
		} else {
			self.logger.info(&format!(
				"Recompiling {} affected mapping(s)...",
				affected.len()
			));
		}

		let report = self.compile_where(|mapping| affected.contains(&mapping.from));

		if report.attempted > 0 {
			self.logger.info(&format!(
				"Recompiled {}/{} mapping(s) affected by {id}",
				report.succeeded(),
				report.attempted
			));
		}

		WatchOutcome::Recompiled {
			id,
			affected,
			compiled: report.succeeded(),
			failed: report.failed(),
		}
	}

	/// The source file at `path`, if it lies inside a known source.
	pub fn owning_source(&self, path: &Path) -> Option<SourceId> {
		self.sources.owning_source(path)
	}

	/// Source base directories to observe. Directories nested inside another
	/// root are left out since recursive watching already covers them.
	pub fn watch_roots(&self) -> Vec<PathBuf> {
		let roots: BTreeSet<PathBuf> = self.sources.values().cloned().collect();

		roots
			.iter()
			.filter(|root| {
				!roots
					.iter()
					.any(|other| other != *root && root.starts_with(other))
			})
			.cloned()
			.collect()
	}

	fn compile_where(&mut self, mut include: impl FnMut(&Mapping) -> bool) -> SyncReport {
		let Self {
			config,
			root,
			sources,
			graph,
			fs,
			logger,
		} = self;

		let ctx = CompileContext::new(sources, &config.site, root.as_path(), &**fs, &**logger);
		let mut report = SyncReport {
			dry_run: config.dry_run,
			..SyncReport::default()
		};

		for mapping in config.mappings.iter().filter(|mapping| include(mapping)) {
			report.attempted += 1;

			match compile_mapping(mapping, &ctx, graph) {
				Ok(output) => {
					logger.info(&format!(
						"Compiled {} -> {}",
						output.from,
						output.to.display()
					));
					report.compiled.push(output.into());
				}
				Err(e) => {
					logger.error(&format!("Failed to compile {}: {e}", mapping.from));
					report.failures.push(MappingFailure {
						from: mapping.from.clone(),
						to: ctx.output_path(mapping),
						error: e.to_string(),
					});
				}
			}
		}

		report
	}
}

/// Acquire sources and compile every mapping once.
pub fn sync_all(
	config: DocsyncConfig,
	root: impl Into<PathBuf>,
	logger: SharedLogger,
) -> DocsyncResult<(Session, SyncReport)> {
	let mut session = Session::prepare(config, root, logger)?;
	let report = session.compile_all()?;

	Ok((session, report))
}

/// Paths inside a `.git` directory never trigger recompilation.
pub fn is_vcs_path(path: &Path) -> bool {
	path.components()
		.any(|component| component == Component::Normal(OsStr::new(".git")))
}

fn default_fs(config: &DocsyncConfig, logger: &SharedLogger) -> Box<dyn FsOps> {
	if config.dry_run {
		Box::new(DryRunFs::new(logger.clone()))
	} else {
		Box::new(RealFs)
	}
}

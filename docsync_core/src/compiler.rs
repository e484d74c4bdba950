use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use crate::DocsyncError;
use crate::DocsyncResult;
use crate::config::Mapping;
use crate::fs::FsOps;
use crate::graph::DepGraph;
use crate::hash::ContentHash;
use crate::include::IncludeResolver;
use crate::logger::Logger;
use crate::site_filter::filter_by_site;
use crate::site_filter::filter_by_site_with_outcome;
use crate::source::SourceDirs;
use crate::source::SourceId;

/// Everything a single mapping compilation reads from its session.
#[derive(Clone, Copy)]
pub struct CompileContext<'a> {
	pub sources: &'a SourceDirs,
	pub site: &'a str,
	/// Relative mapping destinations resolve against this directory.
	pub root: &'a Path,
	pub fs: &'a dyn FsOps,
	pub logger: &'a dyn Logger,
}

impl<'a> CompileContext<'a> {
	pub fn new(
		sources: &'a SourceDirs,
		site: &'a str,
		root: &'a Path,
		fs: &'a dyn FsOps,
		logger: &'a dyn Logger,
	) -> Self {
		Self {
			sources,
			site,
			root,
			fs,
			logger,
		}
	}

	/// The destination of `mapping` on disk.
	pub fn output_path(&self, mapping: &Mapping) -> PathBuf {
		self.root.join(&mapping.to)
	}
}

/// The result of compiling one mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledOutput {
	pub from: String,
	/// The resolved destination path.
	pub to: PathBuf,
	pub content: String,
	pub hash: ContentHash,
	/// Every source identifier that was transcluded, directly or nested.
	pub dependencies: BTreeSet<String>,
}

/// Compile `mapping`: read its source, evaluate site blocks, expand includes,
/// record dependency edges and write the result.
///
/// Include problems never fail the compilation. A missing source, an unknown
/// source key or an I/O failure does.
pub fn compile_mapping(
	mapping: &Mapping,
	ctx: &CompileContext<'_>,
	graph: &mut DepGraph,
) -> DocsyncResult<CompiledOutput> {
	let id = SourceId::parse(&mapping.from)?;
	let Some(source_path) = ctx.sources.resolve(&id) else {
		return Err(DocsyncError::UnknownSource {
			key: id.key,
			id: mapping.from.clone(),
		});
	};

	if !ctx.fs.exists(&source_path) {
		return Err(DocsyncError::SourceFileNotFound {
			id: mapping.from.clone(),
			path: source_path,
		});
	}

	let raw = ctx.fs.read_to_string(&source_path)?;

	let filtered = filter_by_site_with_outcome(&raw, ctx.site);
	if filtered.kept + filtered.removed > 0 {
		ctx.logger.debug(&format!(
			"{}: kept {} and removed {} site block(s) for {}",
			mapping.from, filtered.kept, filtered.removed, ctx.site
		));
	}

	let mut dependencies = BTreeSet::new();
	let resolver = IncludeResolver::new(ctx.sources, ctx.site, ctx.fs, ctx.logger);
	let expanded = resolver.resolve(&filtered.content, &mut dependencies);
	// Transcluded fragments may carry their own site blocks.
	let content = filter_by_site(&expanded, ctx.site);

	for dependency in &dependencies {
		graph.add_dep(dependency.as_str(), mapping.from.as_str());
	}
	graph.add_dep(mapping.from.as_str(), mapping.from.as_str());

	let hash = ContentHash::from_content(&content);
	let to = ctx.output_path(mapping);

	if let Some(parent) = to.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		ctx.fs.ensure_dir(parent)?;
	}
	ctx.fs.write(&to, &content)?;

	ctx.logger.debug(&format!(
		"Compiled {} -> {} ({}, {} dependencies)",
		mapping.from,
		to.display(),
		hash.short(),
		dependencies.len()
	));

	Ok(CompiledOutput {
		from: mapping.from.clone(),
		to,
		content,
		hash,
		dependencies,
	})
}

/// Forget a mapping whose source file was deleted. Previously written
/// output stays on disk.
pub fn delete_mapping(mapping: &Mapping, graph: &mut DepGraph) {
	graph.remove_dep(&mapping.from);
}

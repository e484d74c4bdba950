use std::collections::BTreeSet;

use derive_more::Deref;

use crate::fs::FsOps;
use crate::logger::Logger;
use crate::parser::DirectiveKind;
use crate::parser::scan_directives;
use crate::source::SourceDirs;
use crate::source::SourceId;

/// The identifiers currently being expanded on one recursive path, outermost
/// first.
///
/// Each nested expansion receives its own extended copy, so sibling branches
/// never see each other's entries. Including the same file from two
/// independent branches is fine; only revisiting an ancestor is a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct IncludeStack(Vec<String>);

impl IncludeStack {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.0.iter().any(|entry| entry == id)
	}

	/// A copy of this stack with `id` pushed on top.
	#[must_use]
	pub fn with(&self, id: &str) -> Self {
		let mut entries = self.0.clone();
		entries.push(id.to_string());
		Self(entries)
	}

	/// `a -> b -> id`, starting at the first occurrence of `id`.
	pub fn cycle_chain(&self, id: &str) -> String {
		let start = self.0.iter().position(|entry| entry == id).unwrap_or(0);
		let mut chain: Vec<&str> = self.0[start..].iter().map(String::as_str).collect();
		chain.push(id);
		chain.join(" -> ")
	}
}

/// Expands `<!-- @include <source>:<path> -->` directives.
///
/// Problems with a single directive never fail the expansion. They are
/// replaced by an `<!-- ERROR: ... -->` comment and logged, and every other
/// directive still expands.
pub struct IncludeResolver<'a> {
	sources: &'a SourceDirs,
	site: &'a str,
	fs: &'a dyn FsOps,
	logger: &'a dyn Logger,
}

impl<'a> IncludeResolver<'a> {
	pub fn new(
		sources: &'a SourceDirs,
		site: &'a str,
		fs: &'a dyn FsOps,
		logger: &'a dyn Logger,
	) -> Self {
		Self {
			sources,
			site,
			fs,
			logger,
		}
	}

	/// The active site. Expansion does not evaluate `@site` blocks.
	pub fn site(&self) -> &str {
		self.site
	}

	/// Expand every include in `content`, adding each successfully located
	/// file to `deps`.
	pub fn resolve(&self, content: &str, deps: &mut BTreeSet<String>) -> String {
		self.resolve_with_stack(content, deps, &IncludeStack::new())
	}

	/// Expand with an explicit ancestor chain.
	pub fn resolve_with_stack(
		&self,
		content: &str,
		deps: &mut BTreeSet<String>,
		stack: &IncludeStack,
	) -> String {
		let mut output = String::with_capacity(content.len());
		let mut last = 0;

		for directive in scan_directives(content) {
			let DirectiveKind::Include { reference } = &directive.kind else {
				continue;
			};

			output.push_str(&content[last..directive.span.start]);
			output.push_str(&self.expand(reference, deps, stack));
			last = directive.span.end;
		}

		output.push_str(&content[last..]);
		output
	}

	fn expand(&self, reference: &str, deps: &mut BTreeSet<String>, stack: &IncludeStack) -> String {
		let Ok(id) = SourceId::parse(reference) else {
			self.logger
				.error(&format!("Invalid include reference: {reference}"));
			return format!("<!-- ERROR: Invalid include reference: {reference} -->");
		};

		let Some(file) = self.sources.resolve(&id) else {
			self.logger.error(&format!(
				"Unknown include source `{}` in: {reference}",
				id.key
			));
			return format!(
				"<!-- ERROR: Unknown include source: {} ({reference}) -->",
				id.key
			);
		};

		if !self.fs.exists(&file) {
			self.logger.error(&format!(
				"Include file not found: {reference} ({})",
				file.display()
			));
			return format!("<!-- ERROR: Include file not found: {reference} -->");
		}

		let id = id.to_string();

		if stack.contains(&id) {
			let chain = stack.cycle_chain(&id);
			self.logger
				.error(&format!("Circular include detected: {chain}"));
			return format!("<!-- ERROR: Circular include detected: {chain} -->");
		}

		self.logger
			.debug(&format!("Including: {id} (site: {})", self.site));
		deps.insert(id.clone());

		let included = match self.fs.read_to_string(&file) {
			Ok(included) => included,
			Err(e) => {
				self.logger
					.error(&format!("Failed to read include file {reference}: {e}"));
				return format!("<!-- ERROR: Failed to read include file: {reference} -->");
			}
		};

		let body = strip_front_matter(&included);
		let expanded = self.resolve_with_stack(body, deps, &stack.with(&id));

		expanded.trim().to_string()
	}
}

/// Expand includes in `content` starting from an empty ancestor chain.
pub fn resolve_includes(
	content: &str,
	sources: &SourceDirs,
	site: &str,
	deps: &mut BTreeSet<String>,
	fs: &dyn FsOps,
	logger: &dyn Logger,
) -> String {
	IncludeResolver::new(sources, site, fs, logger).resolve(content, deps)
}

/// Remove a leading front matter block: a first line of exactly `---`
/// through the next line of exactly `---`. Text without a closing line is
/// returned unchanged.
pub fn strip_front_matter(content: &str) -> &str {
	let Some(rest) = content.strip_prefix("---") else {
		return content;
	};

	let Some(rest) = rest
		.strip_prefix("\r\n")
		.or_else(|| rest.strip_prefix('\n'))
	else {
		return content;
	};

	let mut offset = 0;
	for line in rest.split_inclusive('\n') {
		offset += line.len();
		if line.trim_end_matches(['\n', '\r']) == "---" {
			return &rest[offset..];
		}
	}

	content
}

use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Reverse dependency index: a dependency maps to every identifier that must
/// be recompiled when it changes.
///
/// Targets are either mapping `from` identifiers or other source identifiers.
/// The graph may contain cycles; [`DepGraph::affected`] visits every node at
/// most once. Edges are only ever added by compilation and only ever removed
/// through [`DepGraph::remove_dep`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepGraph {
	reverse: BTreeMap<String, BTreeSet<String>>,
}

impl DepGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record that `target` depends on `dependency`. Adding an existing edge
	/// is a no-op.
	pub fn add_dep(&mut self, dependency: impl Into<String>, target: impl Into<String>) {
		self.reverse
			.entry(dependency.into())
			.or_default()
			.insert(target.into());
	}

	/// Everything transitively reachable from `dependency`.
	///
	/// The starting node is only part of the result when a cycle leads back
	/// to it.
	pub fn affected(&self, dependency: &str) -> BTreeSet<String> {
		let mut result = BTreeSet::new();
		let mut stack = vec![dependency];

		while let Some(current) = stack.pop() {
			let Some(targets) = self.reverse.get(current) else {
				continue;
			};

			for target in targets {
				if result.insert(target.clone()) {
					stack.push(target.as_str());
				}
			}
		}

		result
	}

	/// Forget `dependency` entirely: its own edges and every edge pointing at
	/// it. Dependencies left without targets are dropped. Absent identifiers
	/// are ignored.
	pub fn remove_dep(&mut self, dependency: &str) {
		self.reverse.remove(dependency);

		for targets in self.reverse.values_mut() {
			targets.remove(dependency);
		}

		self.reverse.retain(|_, targets| !targets.is_empty());
	}

	/// Direct dependents of `dependency`.
	pub fn targets(&self, dependency: &str) -> Option<&BTreeSet<String>> {
		self.reverse.get(dependency)
	}

	/// Whether `dependency` has recorded dependents.
	pub fn contains(&self, dependency: &str) -> bool {
		self.reverse.contains_key(dependency)
	}

	pub fn has_edge(&self, dependency: &str, target: &str) -> bool {
		self.reverse
			.get(dependency)
			.is_some_and(|targets| targets.contains(target))
	}

	/// Number of dependencies with at least one dependent.
	pub fn len(&self) -> usize {
		self.reverse.len()
	}

	pub fn is_empty(&self) -> bool {
		self.reverse.is_empty()
	}

	pub fn edge_count(&self) -> usize {
		self.reverse.values().map(BTreeSet::len).sum()
	}

	/// Dependencies and their dependents in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
		self.reverse.iter()
	}

	/// Tree rendering for terminals. Each dependency is followed by its
	/// dependents, and dependents that are dependencies themselves show one
	/// more level. Output is sorted and stable.
	pub fn visualize(&self) -> String {
		if self.reverse.is_empty() {
			return "(empty graph)".to_string();
		}

		let mut lines: Vec<String> = vec![];

		for (dependency, targets) in &self.reverse {
			lines.push(dependency.clone());
			let count = targets.len();

			for (index, target) in targets.iter().enumerate() {
				let is_last = index + 1 == count;
				let branch = if is_last { "└─" } else { "├─" };
				lines.push(format!("  {branch} {target}"));

				let Some(nested) = self.reverse.get(target) else {
					continue;
				};

				let connector = if is_last { "  " } else { "│ " };
				let nested_count = nested.len();
				for (nested_index, nested_target) in nested.iter().enumerate() {
					let nested_branch = if nested_index + 1 == nested_count {
						"└─"
					} else {
						"├─"
					};
					lines.push(format!("  {connector}  {nested_branch} {nested_target}"));
				}
			}

			lines.push(String::new());
		}

		lines.join("\n").trim().to_string()
	}

	/// Mermaid flowchart of every edge, sorted.
	pub fn to_mermaid(&self) -> String {
		if self.reverse.is_empty() {
			return "graph TD\n  empty[Empty Graph]".to_string();
		}

		let mut lines = vec!["graph TD".to_string()];

		for (dependency, targets) in &self.reverse {
			for target in targets {
				lines.push(format!(
					"  {}[\"{dependency}\"] --> {}[\"{target}\"]",
					mermaid_id(dependency),
					mermaid_id(target),
				));
			}
		}

		lines.join("\n")
	}
}

fn mermaid_id(identifier: &str) -> String {
	identifier
		.chars()
		.map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
		.collect()
}

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Pull markdown fragments from many repositories into per-site documentation trees.",
	long_about = "docsync compiles markdown from several source repositories into one output \
	              tree per site.\n\nFragments are shared with `<!-- @include source:path.md \
	              -->` and tailored per site with `<!-- @site a, !b -->` ... `<!-- @endsite \
	              -->` blocks.\n\nQuick start:\n  docsync sync   Compile every mapping once\n  \
	              docsync watch  Recompile affected mappings as sources change\n  docsync graph  \
	              Print the include dependency graph"
)]
pub struct DocsyncCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Path to the config file. Defaults to the first of `docsync.toml`,
	/// `.docsync.toml` and `.config/docsync.toml` in the project root.
	#[arg(long, short, global = true)]
	pub config: Option<PathBuf>,

	/// Override the active site from the config file.
	#[arg(long, global = true)]
	pub site: Option<String>,

	/// Enable debug output.
	#[arg(long, global = true, default_value_t = false)]
	pub debug: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Acquire every source and compile every mapping once.
	///
	/// Git sources are cloned into the cache directory on first use and
	/// pulled afterwards. Local sources are used in place. A mapping that
	/// fails does not stop the others. Exits with a non-zero status code when
	/// a source cannot be acquired or every mapping failed.
	Sync {
		/// Read and compile everything but write nothing. Each skipped write
		/// is reported instead.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Output format for the summary. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = SyncFormat::Text)]
		format: SyncFormat,
	},
	/// Sync, then recompile affected mappings whenever a source file changes.
	///
	/// Every source base directory is watched recursively. Each change is
	/// looked up in the include dependency graph so only the mappings that
	/// use the changed file are recompiled.
	Watch {
		/// Read and compile everything but write nothing.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// Print the include dependency graph.
	///
	/// Runs a dry-run sync to discover every include, then prints which
	/// mappings each source file feeds into.
	Graph {
		/// Use `text` for an indented listing or `mermaid` for a flowchart.
		#[arg(long, value_enum, default_value_t = GraphFormat::Text)]
		format: GraphFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SyncFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Includes every compiled
	/// mapping with its content hash and every failure with its error.
	Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GraphFormat {
	/// One line per source file followed by its dependents.
	Text,
	/// A mermaid `graph TD` flowchart.
	Mermaid,
}

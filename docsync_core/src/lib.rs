//! `docsync_core` is the compilation engine behind the `docsync` documentation
//! synchroniser. Markdown fragments live in several source trees (git
//! repositories or local directories) and are projected into one output
//! tree per site. Along the way transclusion directives are expanded and
//! per-site conditional blocks are evaluated.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source file
//!   -> Site filter (evaluates `@site` / `@endsite` blocks for the active site)
//!   -> Include resolver (expands `@include <source>:<path>` recursively)
//!   -> Site filter (blocks that arrived through transclusion)
//!   -> Hasher + write (SHA-256 of the final text, written to the mapping's `to`)
//! ```
//!
//! Every expansion records an edge in the reverse [`DepGraph`], so a change
//! to one fragment recompiles exactly the mappings that use it.
//!
//! ## Directives
//!
//! ```markdown
//! <!-- @include common:snippets/warning.md -->
//!
//! <!-- @site site-a, site-b -->
//! Only on site-a and site-b.
//! <!-- @endsite -->
//!
//! <!-- @site !site-c -->
//! Everywhere except site-c.
//! <!-- @endsite -->
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration loading from `docsync.toml`.
//! - [`source`] - Source identifiers and source acquisition.
//! - [`fs`] - The filesystem capability with real and dry-run variants.
//!
//! ## Key Types
//!
//! - [`Session`] - Owns the sources and the dependency graph for one sync or
//!   watch run.
//! - [`DepGraph`] - Reverse dependency index used for incremental rebuilds.
//! - [`IncludeResolver`] - Recursive transclusion with path-scoped cycle
//!   detection.
//! - [`DocsyncConfig`] - Configuration loaded from `docsync.toml`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsync_core::DocsyncConfig;
//! use docsync_core::TracingLogger;
//! use docsync_core::sync_all;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let config = DocsyncConfig::load(root).unwrap().unwrap();
//! let (_session, report) = sync_all(config, root, TracingLogger::shared(false)).unwrap();
//!
//! println!("{}/{} mapping(s) compiled", report.succeeded(), report.attempted);
//! ```

pub use compiler::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use fs::*;
pub use graph::*;
pub use hash::*;
pub use include::*;
pub use logger::*;
pub use parser::*;
pub use site_filter::*;
pub use source::*;

mod compiler;
pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod fs;
mod graph;
mod hash;
mod include;
pub(crate) mod lexer;
mod logger;
mod parser;
mod site_filter;
pub mod source;
pub(crate) mod tokens;

#[cfg(test)]
mod __fixtures;

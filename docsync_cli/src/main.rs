use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;

use clap::Parser;
use docsync_cli::Commands;
use docsync_cli::DocsyncCli;
use docsync_cli::GraphFormat;
use docsync_cli::SyncFormat;
use docsync_core::AnyEmptyResult;
use docsync_core::AnyResult;
use docsync_core::DocsyncConfig;
use docsync_core::DocsyncError;
use docsync_core::FileEvent;
use docsync_core::FsOps;
use docsync_core::RealFs;
use docsync_core::Session;
use docsync_core::SharedLogger;
use docsync_core::SyncReport;
use docsync_core::TracingLogger;
use docsync_core::WatchOutcome;
use docsync_core::sync_all;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = DocsyncCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.debug, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Sync { dry_run, format }) => run_sync(&args, dry_run, format),
		Some(Commands::Watch { dry_run }) => run_watch(&args, dry_run),
		Some(Commands::Graph { format }) => run_graph(&args, format),
		None => {
			eprintln!("No subcommand specified. Run `docsync --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<DocsyncError>() {
			Ok(docsync_err) => {
				let report: miette::Report = (*docsync_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(1);
	}
}

/// Progress goes to stderr so stdout only carries command output.
fn init_tracing(debug: bool, use_color: bool) {
	let filter = if debug {
		EnvFilter::new("debug")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
	};
	let ansi = use_color && supports_color::on(supports_color::Stream::Stderr).is_some();

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(ansi)
		.with_target(false)
		.init();
}

fn resolve_root(args: &DocsyncCli) -> AnyResult<PathBuf> {
	let root = args
		.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

	// Watch events carry canonical paths.
	Ok(root.canonicalize().map_err(DocsyncError::from)?)
}

fn load_config(args: &DocsyncCli, root: &Path, dry_run: bool) -> AnyResult<DocsyncConfig> {
	let mut config = match &args.config {
		Some(path) if !path.is_file() => {
			return Err(DocsyncError::ConfigNotFound(path.clone()).into());
		}
		Some(path) => DocsyncConfig::load_from(path)?,
		None => {
			DocsyncConfig::load(root)?
				.ok_or_else(|| DocsyncError::ConfigNotFound(root.to_path_buf()))?
		}
	};

	if let Some(site) = &args.site {
		config.site.clone_from(site);
	}

	if dry_run {
		config.dry_run = true;
	}

	Ok(config)
}

fn logger(args: &DocsyncCli) -> SharedLogger {
	TracingLogger::shared(args.debug)
}

/// Acquire sources and compile everything, naming the failed mappings when
/// the whole run fails.
fn sync(args: &DocsyncCli, root: &Path, dry_run: bool) -> AnyResult<(Session, SyncReport)> {
	let config = load_config(args, root, dry_run)?;

	match sync_all(config, root, logger(args)) {
		Ok(result) => Ok(result),
		Err(e) => {
			if let DocsyncError::AllMappingsFailed { failed } = &e {
				for from in failed {
					eprintln!("  {} {from}", colored!("✗", red));
				}
			}
			Err(e.into())
		}
	}
}

fn run_sync(args: &DocsyncCli, dry_run: bool, format: SyncFormat) -> AnyEmptyResult {
	let root = resolve_root(args)?;
	let (session, report) = sync(args, &root, dry_run)?;

	match format {
		SyncFormat::Text => print_summary(&session, &report),
		SyncFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
	}

	Ok(())
}

fn print_summary(session: &Session, report: &SyncReport) {
	let site = &session.config().site;

	if report.dry_run {
		println!("{}", colored!("Dry run: nothing was written.", yellow));
	}

	println!(
		"{}",
		colored!(
			format!(
				"Compiled {}/{} mapping(s) for site `{site}`.",
				report.succeeded(),
				report.attempted
			),
			bold
		)
	);

	for compiled in &report.compiled {
		println!(
			"  {} {} -> {} ({})",
			colored!("✓", green),
			compiled.from,
			make_relative(&compiled.to, session.root()),
			compiled.hash.short()
		);
	}

	for failure in &report.failures {
		println!(
			"  {} {}: {}",
			colored!("✗", red),
			failure.from,
			failure.error
		);
	}

	if !report.is_ok() {
		println!(
			"{}",
			colored!(
				format!(
					"{} mapping(s) failed: {}",
					report.failed(),
					report.failed_mappings().join(", ")
				),
				red
			)
		);
	}
}

fn run_watch(args: &DocsyncCli, dry_run: bool) -> AnyEmptyResult {
	let root = resolve_root(args)?;
	let (mut session, report) = sync(args, &root, dry_run)?;
	print_summary(&session, &report);

	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			match res {
				Ok(event) => {
					let _ = tx.send(event);
				}
				Err(e) => tracing::warn!("watch error: {e}"),
			}
		})?;

	use notify::Watcher;
	let watch_roots = session.watch_roots();
	for dir in &watch_roots {
		watcher.watch(dir, notify::RecursiveMode::Recursive)?;
	}

	println!(
		"\nWatching {} source director{} for changes... (press Ctrl+C to stop)",
		watch_roots.len(),
		if watch_roots.len() == 1 { "y" } else { "ies" }
	);

	// One event at a time, in arrival order.
	for event in &rx {
		for file_event in file_events(&event) {
			if RealFs.stat(&file_event.path).is_ok_and(|stat| stat.is_dir) {
				continue;
			}

			if let WatchOutcome::Recompiled {
				id,
				compiled,
				failed,
				..
			} = session.handle_event(&file_event)
			{
				if failed > 0 {
					println!(
						"{} {id}: {compiled} recompiled, {failed} failed",
						colored!("✗", red)
					);
				} else if compiled > 0 {
					println!("{} {id}: {compiled} recompiled", colored!("✓", green));
				}
			}
		}
	}

	Ok(())
}

/// Translate a `notify` event into the changes a session understands.
/// Access and metadata notifications carry no content change.
fn file_events(event: &notify::Event) -> Vec<FileEvent> {
	use notify::EventKind;
	use notify::event::ModifyKind;
	use notify::event::RenameMode;

	match event.kind {
		EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
			event
				.paths
				.iter()
				.enumerate()
				.map(|(index, path)| {
					if index == 0 {
						FileEvent::deleted(path)
					} else {
						FileEvent::changed(path)
					}
				})
				.collect()
		}
		EventKind::Modify(ModifyKind::Name(RenameMode::From)) | EventKind::Remove(_) => {
			event.paths.iter().map(FileEvent::deleted).collect()
		}
		EventKind::Modify(ModifyKind::Metadata(_)) => vec![],
		EventKind::Create(_) | EventKind::Modify(_) => {
			event.paths.iter().map(FileEvent::changed).collect()
		}
		_ => vec![],
	}
}

fn run_graph(args: &DocsyncCli, format: GraphFormat) -> AnyEmptyResult {
	let root = resolve_root(args)?;
	let (session, _report) = sync(args, &root, true)?;
	let graph = session.graph();

	match format {
		GraphFormat::Text => println!("{}", graph.visualize()),
		GraphFormat::Mermaid => println!("{}", graph.to_mermaid()),
	}

	Ok(())
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}

use std::sync::Arc;

/// Logging capability handed to every component that reports progress.
///
/// Nothing in the engine logs through a global. Callers choose the
/// implementation: the CLI uses [`TracingLogger`], tests record messages.
pub trait Logger: Send + Sync {
	fn info(&self, message: &str);
	fn success(&self, message: &str);
	fn warn(&self, message: &str);
	fn error(&self, message: &str);
	fn debug(&self, message: &str);
}

pub type SharedLogger = Arc<dyn Logger>;

/// Forwards messages to `tracing` events.
///
/// `success` is an `info` event carrying `status = "success"`. Debug output
/// is only emitted when enabled on construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger {
	debug: bool,
}

impl TracingLogger {
	pub fn new(debug: bool) -> Self {
		Self { debug }
	}

	pub fn debug_enabled(&self) -> bool {
		self.debug
	}

	pub fn shared(debug: bool) -> SharedLogger {
		Arc::new(Self::new(debug))
	}
}

impl Logger for TracingLogger {
	fn info(&self, message: &str) {
		tracing::info!("{message}");
	}

	fn success(&self, message: &str) {
		tracing::info!(status = "success", "{message}");
	}

	fn warn(&self, message: &str) {
		tracing::warn!("{message}");
	}

	fn error(&self, message: &str) {
		tracing::error!("{message}");
	}

	fn debug(&self, message: &str) {
		if self.debug {
			tracing::debug!("{message}");
		}
	}
}

//! Live adapter for the `Logger` port backed by `tracing`.

use tracing::Level;

use crate::ports::Logger;

/// Forwards messages to the installed `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "bug_buddy", "{message}"),
            Level::WARN => tracing::warn!(target: "bug_buddy", "{message}"),
            Level::INFO => tracing::info!(target: "bug_buddy", "{message}"),
            Level::DEBUG => tracing::debug!(target: "bug_buddy", "{message}"),
            _ => tracing::trace!(target: "bug_buddy", "{message}"),
        }
    }
}

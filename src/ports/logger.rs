//! Logger port for leveled diagnostic messages.

use tracing::Level;

/// Accepts leveled log messages.
///
/// The logger is handed to every component that reports progress instead of
/// being looked up globally, so tests can capture exactly what was emitted.
pub trait Logger: Send + Sync {
    /// Emits `message` at `level`.
    fn log(&self, level: Level, message: &str);

    /// Emits an info-level message.
    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    /// Emits a debug-level message.
    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    /// Emits a warning-level message.
    fn warning(&self, message: &str) {
        self.log(Level::WARN, message);
    }
}

//! Process-wide log subscriber setup.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::{BugBuddyError, Result};

/// Parses a level name, accepting `WARNING` as an alias for `WARN`.
///
/// # Errors
///
/// Returns [`BugBuddyError::Configuration`] for unknown level names.
pub fn parse_level(level: &str) -> Result<Level> {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Ok(Level::TRACE),
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARN" | "WARNING" => Ok(Level::WARN),
        "ERROR" | "CRITICAL" => Ok(Level::ERROR),
        other => Err(BugBuddyError::Configuration(format!("Unknown log level: {other}"))),
    }
}

/// Installs a stdout subscriber filtered at `level` for this crate's events.
///
/// Installing twice is not an error; the first subscriber stays active.
///
/// # Errors
///
/// Returns [`BugBuddyError::Configuration`] for unknown level names.
pub fn init_logging(level: &str) -> Result<()> {
    let level = parse_level(level)?;
    let filter = EnvFilter::try_new(format!("bug_buddy={}", level.as_str().to_ascii_lowercase()))
        .map_err(|e| BugBuddyError::Logging(e.to_string()))?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .without_time()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            target: "bug_buddy",
            "{} logger initialized at level {level}.",
            env!("CARGO_PKG_VERSION")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_names_case_insensitively() {
        assert_eq!(parse_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_level("Warning").unwrap(), Level::WARN);
        assert_eq!(parse_level(" error ").unwrap(), Level::ERROR);
    }

    #[test]
    fn rejects_unknown_levels() {
        assert!(matches!(parse_level("loud"), Err(BugBuddyError::Configuration(_))));
    }

    #[test]
    fn init_is_idempotent() {
        assert!(init_logging("debug").is_ok());
        assert!(init_logging("info").is_ok());
    }
}

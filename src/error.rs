//! Error types for the bug-filing pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building, filing, or caching a bug report.
///
/// None of these are retried. When one occurs inside a guarded call it
/// replaces the failure that triggered the report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BugBuddyError {
    /// Invalid listener, tracker, or client configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A report was about to be filed but no tracker client was resolved.
    #[error("No remote issue tracker configured")]
    NoTrackerConfigured,

    /// The tracker answered with a non-success status.
    #[error("Remote request failed with status {status}: {body}")]
    RemoteRequest {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the tracker.
        body: String,
    },

    /// The HTTP request could not be completed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A tracker response did not have the expected shape.
    #[error("Failed to normalize issue: {0}")]
    Normalization(String),

    /// The existing cache file could not be parsed as a JSON array.
    #[error("Cache file {} is not a valid issue cache: {source}", path.display())]
    CacheWrite {
        /// Cache file location.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// The cache file could not be read or written.
    #[error("Cannot access cache file {}: {message}", path.display())]
    CachePermission {
        /// Cache file location.
        path: PathBuf,
        /// Underlying I/O failure.
        message: String,
    },

    /// A credential environment variable is not set.
    #[error("{var} environment variable not set")]
    MissingCredentials {
        /// Name of the missing variable.
        var: &'static str,
    },

    /// The global log subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BugBuddyError>;

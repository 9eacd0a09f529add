//! Runtime configuration read from the environment.
//!
//! | Variable              | Default                     |
//! |-----------------------|-----------------------------|
//! | `BUG_BUDDY_LOG_LEVEL` | `INFO`                      |
//! | `BUG_BUDDY_CACHE`     | `~/.bug_buddy.cache`        |
//! | `GITLAB_URL`          | `https://gitlab.com/api/v4` |
//!
//! A `.env` file in the working directory is loaded first when present.

use std::env;
use std::path::PathBuf;

use crate::adapters::live::gitlab::GITLAB_API_URL;
use crate::issue::default_cache_path;

/// Log level used when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugBuddyConfig {
    /// Level threshold passed to [`crate::logging::init_logging`].
    pub log_level: String,
    /// Issue cache file.
    pub cache_path: PathBuf,
    /// GitLab API root.
    pub gitlab_url: String,
}

impl Default for BugBuddyConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            cache_path: default_cache_path(),
            gitlab_url: GITLAB_API_URL.to_string(),
        }
    }
}

impl BugBuddyConfig {
    /// Loads `.env` if present, then reads the configuration variables.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            log_level: non_empty("BUG_BUDDY_LOG_LEVEL").unwrap_or(defaults.log_level),
            cache_path: non_empty("BUG_BUDDY_CACHE").map_or(defaults.cache_path, PathBuf::from),
            gitlab_url: non_empty("GITLAB_URL").unwrap_or(defaults.gitlab_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_apply_without_variables() {
        let config = BugBuddyConfig::from_lookup(|_| None);
        assert_eq!(config, BugBuddyConfig::default());
        assert_eq!(config.log_level, "INFO");
        assert!(config.cache_path.ends_with(".bug_buddy.cache"));
    }

    #[test]
    fn variables_override_defaults() {
        let vars: HashMap<&str, &str> = [
            ("BUG_BUDDY_LOG_LEVEL", "debug"),
            ("BUG_BUDDY_CACHE", "/tmp/bb.cache"),
            ("GITLAB_URL", "https://gitlab.internal/api/v4"),
        ]
        .into_iter()
        .collect();
        let config = BugBuddyConfig::from_lookup(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.cache_path, PathBuf::from("/tmp/bb.cache"));
        assert_eq!(config.gitlab_url, "https://gitlab.internal/api/v4");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = BugBuddyConfig::from_lookup(|_| Some("  ".into()));
        assert_eq!(config, BugBuddyConfig::default());
    }
}

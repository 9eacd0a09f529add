//! Normalized tracker issue and the local issue cache.
//!
//! The cache is a single JSON array. Every filed issue is flattened into a
//! [`CacheRecord`] and appended by rewriting the whole file:
//!
//! ```text
//! [
//!     {
//!         "id": 7,
//!         "title": "BugBuddy-…",
//!         "author": "Jane Doe_jdoe_active",
//!         "labels": "ValueError_BugBuddy",
//!         …
//!     }
//! ]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BugBuddyError, Result};
use crate::ports::FileSystem;

/// Cache file name, resolved against the home directory.
pub const DEFAULT_CACHE_FILE: &str = ".bug_buddy.cache";

/// Returns `~/.bug_buddy.cache`, or the bare file name when no home directory is known.
#[must_use]
pub fn default_cache_path() -> PathBuf {
    dirs::home_dir()
        .map_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE), |home| home.join(DEFAULT_CACHE_FILE))
}

/// Author of a tracker issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name.
    pub name: String,
    /// Account username.
    pub username: String,
    /// Account state (e.g. `"active"`).
    pub state: String,
}

/// Tracker-agnostic issue record.
///
/// Built only through [`Issue::from_raw`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    id: u64,
    title: String,
    state: String,
    project_id: u64,
    author: Author,
    created_at: String,
    updated_at: String,
    description: String,
    labels: Vec<String>,
}

/// Shape of a GitLab issue payload; unknown keys are ignored.
#[derive(Deserialize)]
struct RawIssue {
    id: u64,
    title: String,
    state: String,
    project_id: u64,
    author: Author,
    created_at: String,
    updated_at: String,
    description: String,
    labels: Vec<String>,
}

impl Issue {
    /// Normalizes a tracker response mapping.
    ///
    /// # Errors
    ///
    /// Returns [`BugBuddyError::Normalization`] when a required key is missing
    /// or has the wrong type.
    pub fn from_raw(response: &serde_json::Value) -> Result<Self> {
        let raw = RawIssue::deserialize(response)
            .map_err(|e| BugBuddyError::Normalization(e.to_string()))?;
        Ok(Self {
            id: raw.id,
            title: raw.title,
            state: raw.state,
            project_id: raw.project_id,
            author: raw.author,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            description: raw.description,
            labels: raw.labels,
        })
    }

    /// Tracker-assigned ID.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Issue title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Issue state, as reported by the tracker.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Remote project ID.
    #[must_use]
    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    /// Issue author.
    #[must_use]
    pub fn author(&self) -> &Author {
        &self.author
    }

    /// Creation timestamp, unparsed.
    #[must_use]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Last update timestamp, unparsed.
    #[must_use]
    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    /// Markdown description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Issue labels in tracker order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Appends this issue to the JSON array cache at `path`.
    ///
    /// A missing file is created with a one-element array. An existing file is
    /// parsed, extended, and rewritten in full.
    ///
    /// # Errors
    ///
    /// Returns [`BugBuddyError::CacheWrite`] if the existing file is not a JSON
    /// array, and [`BugBuddyError::CachePermission`] if it cannot be read or written.
    pub fn cache(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        let mut records: Vec<serde_json::Value> = if fs.exists(path) {
            let contents = fs.read_to_string(path).map_err(|e| BugBuddyError::CachePermission {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            serde_json::from_str(&contents)
                .map_err(|source| BugBuddyError::CacheWrite { path: path.to_path_buf(), source })?
        } else {
            Vec::new()
        };

        let record = serde_json::to_value(CacheRecord::from(self))
            .map_err(|source| BugBuddyError::CacheWrite { path: path.to_path_buf(), source })?;
        records.push(record);

        let rendered = render_records(&records)
            .map_err(|source| BugBuddyError::CacheWrite { path: path.to_path_buf(), source })?;
        fs.write(path, &rendered).map_err(|e| BugBuddyError::CachePermission {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Appends this issue to `~/.bug_buddy.cache`.
    ///
    /// # Errors
    ///
    /// Same as [`Issue::cache`].
    pub fn cache_default(&self, fs: &dyn FileSystem) -> Result<()> {
        self.cache(fs, &default_cache_path())
    }
}

/// Flattened issue as stored in the cache file.
///
/// Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Tracker-assigned ID.
    pub id: u64,
    /// Issue title.
    pub title: String,
    /// Issue state.
    pub state: String,
    /// Remote project ID.
    pub project_id: u64,
    /// `name_username_state`.
    pub author: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
    /// Markdown description.
    pub description: String,
    /// Labels joined with `_`.
    pub labels: String,
}

impl From<&Issue> for CacheRecord {
    fn from(issue: &Issue) -> Self {
        let author = &issue.author;
        Self {
            id: issue.id,
            title: issue.title.clone(),
            state: issue.state.clone(),
            project_id: issue.project_id,
            author: [author.name.as_str(), &author.username, &author.state].join("_"),
            created_at: issue.created_at.clone(),
            updated_at: issue.updated_at.clone(),
            description: issue.description.clone(),
            labels: issue.labels.join("_"),
        }
    }
}

/// Pretty-prints with four-space indentation.
fn render_records(records: &[serde_json::Value]) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

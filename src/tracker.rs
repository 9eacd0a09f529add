//! Tracker selection and the issue conventions every tracker client applies.

use std::fmt;

use crate::error::{BugBuddyError, Result};
use crate::ports::IdGenerator;

/// Label attached to every issue this crate files.
pub const SENTINEL_LABEL: &str = "BugBuddy";

/// Prefix of generated issue titles.
pub const TITLE_PREFIX: &str = "BugBuddy-";

/// Remote tracker that receives bug reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrackerKind {
    /// No tracker selected.
    #[default]
    None,
    /// GitLab issues API.
    GitLab,
    /// GitHub issues; declared but not implemented.
    GitHub,
}

impl TrackerKind {
    /// Builds a selection from the `gitlab`/`github` flag pair.
    ///
    /// # Errors
    ///
    /// Returns [`BugBuddyError::Configuration`] when both flags are set.
    pub fn from_flags(gitlab: bool, github: bool) -> Result<Self> {
        match (gitlab, github) {
            (true, true) => Err(BugBuddyError::Configuration(
                "Select either gitlab or github, not both.".into(),
            )),
            (true, false) => Ok(Self::GitLab),
            (false, true) => Ok(Self::GitHub),
            (false, false) => Ok(Self::None),
        }
    }

    /// Returns `true` unless no tracker is selected.
    #[must_use]
    pub fn is_selected(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::GitLab => f.write_str("Gitlab"),
            Self::GitHub => f.write_str("Github"),
        }
    }
}

/// Returns the caller's labels followed by exactly one sentinel label.
#[must_use]
pub fn ensure_sentinel_label(labels: Option<Vec<String>>) -> Vec<String> {
    let mut labels = labels.unwrap_or_default();
    labels.retain(|label| label != SENTINEL_LABEL);
    labels.push(SENTINEL_LABEL.to_string());
    labels
}

/// Returns `title`, or `BugBuddy-<id>` when no title was given.
#[must_use]
pub fn default_title(title: Option<&str>, id_gen: &dyn IdGenerator) -> String {
    title.map_or_else(|| format!("{TITLE_PREFIX}{}", id_gen.generate_id()), str::to_string)
}

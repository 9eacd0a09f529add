//! Issue tracker port for filing and fetching bug reports.

use crate::error::Result;
use crate::issue::Issue;

/// Issues returned by [`IssueTrackerClient::get_issues`].
#[derive(Debug, Clone)]
pub enum FetchedIssues {
    /// Responses normalized into [`Issue`] values.
    Normalized(Vec<Issue>),
    /// Tracker payloads passed through untouched.
    Raw(Vec<serde_json::Value>),
}

impl FetchedIssues {
    /// Number of issues fetched.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Normalized(issues) => issues.len(),
            Self::Raw(issues) => issues.len(),
        }
    }

    /// Returns `true` when nothing was fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A remote issue tracker bound to one set of credentials.
///
/// Implementations hold only static configuration, so a single client can be
/// reused across guarded calls.
pub trait IssueTrackerClient: Send + Sync {
    /// Creates an issue in `project_id` and returns it normalized.
    ///
    /// A missing `title` is generated as `BugBuddy-<uuid>`. The sentinel
    /// label is always present exactly once in the submitted labels.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteRequest`](crate::error::BugBuddyError::RemoteRequest) on a
    /// non-success status, or a transport/normalization error.
    fn create_issue(
        &self,
        project_id: u64,
        description: &str,
        labels: Option<Vec<String>>,
        title: Option<&str>,
    ) -> Result<Issue>;

    /// Fetches all issues of `project_id`, or only issue `id` when given.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteRequest`](crate::error::BugBuddyError::RemoteRequest) on a
    /// non-success status, or a transport/normalization error.
    fn get_issues(&self, project_id: u64, id: Option<u64>, normalize: bool)
        -> Result<FetchedIssues>;
}

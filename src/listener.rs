//! Listener turning a captured failure into a filed and cached issue.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{BugBuddyError, Result};
use crate::issue::Issue;
use crate::ports::{FileSystem, IssueTrackerClient, Logger};
use crate::trace::{Trace, TraceFrame};
use crate::tracker::TrackerKind;

/// Marker emitted in every log line about a detected bug.
pub const MASCOT: &str = "\u{1F41D}";

/// Files one report per failed guarded call.
pub struct Listener {
    project_id: Option<u64>,
    tracker: TrackerKind,
    logger: Arc<dyn Logger>,
    fs: Arc<dyn FileSystem>,
    cache_path: PathBuf,
}

impl Listener {
    /// Creates a listener.
    ///
    /// # Errors
    ///
    /// Returns [`BugBuddyError::Configuration`] when a project ID is given
    /// without selecting a tracker.
    pub fn new(
        project_id: Option<u64>,
        tracker: TrackerKind,
        logger: Arc<dyn Logger>,
        fs: Arc<dyn FileSystem>,
        cache_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        if project_id.is_some() && !tracker.is_selected() {
            return Err(BugBuddyError::Configuration(
                "Must specify gitlab or github if project_id specified.".into(),
            ));
        }
        Ok(Self { project_id, tracker, logger, fs, cache_path: cache_path.into() })
    }

    /// Remote project that receives reports.
    #[must_use]
    pub fn project_id(&self) -> Option<u64> {
        self.project_id
    }

    /// Selected tracker.
    #[must_use]
    pub fn tracker(&self) -> TrackerKind {
        self.tracker
    }

    /// Logger shared with the guard.
    #[must_use]
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Filesystem used for caching and source lookups.
    #[must_use]
    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Location of the local issue cache.
    #[must_use]
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// The mascot marker.
    #[must_use]
    pub fn mascot(&self) -> &'static str {
        MASCOT
    }

    /// Drops every frame from the innermost frame of this crate outward.
    ///
    /// What remains are the caller's own frames between the guard and the
    /// failure, still outermost-first.
    #[must_use]
    pub fn filter_tb(&self, frames: &[TraceFrame]) -> Vec<TraceFrame> {
        let mut kept: Vec<TraceFrame> =
            frames.iter().rev().take_while(|frame| !frame.is_own()).cloned().collect();
        kept.reverse();
        kept
    }

    /// Renders frames as a markdown table followed by the raw traceback.
    #[must_use]
    pub fn description(&self, frames: &[TraceFrame], raw: &str) -> String {
        let mut rows = vec![
            "### Traceback".to_string(),
            "| File | Callable | Line | Code |".to_string(),
            "| --- | --- | --- | --- |".to_string(),
        ];
        for frame in frames {
            rows.push(format!(
                "| {} | {} | {} | {} |",
                escape_cell(&frame.filename),
                escape_cell(&frame.name).replace('_', "\\_"),
                frame.lineno,
                escape_cell(&frame.line),
            ));
        }

        rows.push("\n<details><summary>Raw traceback</summary>".to_string());
        rows.push(raw.to_string());
        rows.push("</details>".to_string());

        rows.join("\n")
    }

    /// Files `trace` as an issue labeled `exception_kind` and caches it.
    ///
    /// # Errors
    ///
    /// Returns [`BugBuddyError::NoTrackerConfigured`] when `remote` is `None`,
    /// [`BugBuddyError::Configuration`] when no project ID is set, and any
    /// error raised by the tracker or the cache.
    pub fn record(
        &self,
        trace: &Trace,
        exception_kind: &str,
        remote: Option<&dyn IssueTrackerClient>,
    ) -> Result<Issue> {
        let remote = remote.ok_or(BugBuddyError::NoTrackerConfigured)?;
        let project_id = self.project_id.ok_or_else(|| {
            BugBuddyError::Configuration("A project ID is required to file an issue.".into())
        })?;

        let frames = self.filter_tb(trace.frames());
        let description = self.description(&frames, trace.raw());
        self.logger.debug(&format!(
            "Filing {exception_kind} with {} frame(s) to project {project_id}",
            frames.len()
        ));

        let issue = remote.create_issue(
            project_id,
            &description,
            Some(vec![exception_kind.to_string()]),
            None,
        )?;
        issue.cache(self.fs.as_ref(), &self.cache_path)?;

        Ok(issue)
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

//! Service context bundling configuration and all port trait objects.

use std::sync::Arc;

use crate::adapters::live::{GitlabIssuesClient, LiveFileSystem, LiveIdGenerator, TracingLogger};
use crate::config::BugBuddyConfig;
use crate::error::Result;
use crate::listener::Listener;
use crate::ports::{FileSystem, IdGenerator, IssueTrackerClient, Logger};
use crate::tracker::TrackerKind;

/// Bundles configuration and port trait objects into a single context.
///
/// Each port field provides access to one external boundary. Listeners and
/// tracker clients are built from the same context so they share them.
pub struct ServiceContext {
    /// Resolved configuration.
    pub config: BugBuddyConfig,
    /// Log sink.
    pub logger: Arc<dyn Logger>,
    /// Filesystem for the issue cache and source lookups.
    pub fs: Arc<dyn FileSystem>,
    /// ID generator for issue titles.
    pub id_gen: Arc<dyn IdGenerator>,
}

impl ServiceContext {
    /// Creates a live context from the environment.
    #[must_use]
    pub fn live() -> Self {
        Self::with_config(BugBuddyConfig::from_env())
    }

    /// Creates a context with live adapters and the given configuration.
    #[must_use]
    pub fn with_config(config: BugBuddyConfig) -> Self {
        Self {
            config,
            logger: Arc::new(TracingLogger),
            fs: Arc::new(LiveFileSystem),
            id_gen: Arc::new(LiveIdGenerator),
        }
    }

    /// Builds a listener writing to the configured cache.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `project_id` is set without a tracker.
    pub fn listener(&self, project_id: Option<u64>, tracker: TrackerKind) -> Result<Listener> {
        Listener::new(
            project_id,
            tracker,
            Arc::clone(&self.logger),
            Arc::clone(&self.fs),
            self.config.cache_path.clone(),
        )
    }

    /// Resolves the client for `tracker`.
    ///
    /// Trackers without an implementation log a warning and resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitLab client cannot be configured, e.g. when
    /// `GITLAB_TOKEN` is unset.
    pub fn remote_client(&self, tracker: TrackerKind) -> Result<Option<Box<dyn IssueTrackerClient>>> {
        match tracker {
            TrackerKind::GitLab => {
                let client = GitlabIssuesClient::from_env(
                    self.config.gitlab_url.clone(),
                    Arc::clone(&self.id_gen),
                    Arc::clone(&self.logger),
                )?;
                Ok(Some(Box::new(client)))
            }
            TrackerKind::GitHub => {
                self.logger.warning("Github not yet supported.");
                Ok(None)
            }
            TrackerKind::None => {
                self.logger.warning("No remote issue tracker specified.");
                Ok(None)
            }
        }
    }
}

//! The guard that wraps an entry point and files its failures.

use std::any::Any;
use std::fmt::{Debug, Display};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use crate::context::ServiceContext;
use crate::error::{BugBuddyError, Result};
use crate::listener::{Listener, MASCOT};
use crate::logging::init_logging;
use crate::ports::{FileSystem, IdGenerator, IssueTrackerClient, Logger};
use crate::trace::{install_panic_hook, take_panic_capture, GuardScope, Trace};
use crate::tracker::TrackerKind;

/// Exception kind reported for panics.
pub const PANIC_KIND: &str = "panic";

/// Wraps `runner` with a guard using default settings: no project and no
/// tracker.
///
/// Without a tracker every failure is superseded by
/// [`BugBuddyError::NoTrackerConfigured`].
pub fn bug_buddy<A, T, E, F>(runner: F) -> impl FnOnce(A) -> std::result::Result<T, E>
where
    F: FnOnce(A) -> std::result::Result<T, E>,
    E: Debug + Display + From<BugBuddyError>,
{
    move |arg| match BugBuddy::builder().build() {
        Ok(guard) => guard.run(|| runner(arg)),
        Err(error) => Err(E::from(error)),
    }
}

/// A configured guard.
///
/// A failure of the guarded call is turned into an issue on the selected
/// tracker and cached locally, then handed back to the caller unchanged.
pub struct BugBuddy {
    listener: Listener,
    context: ServiceContext,
    remote: Option<Arc<dyn IssueTrackerClient>>,
}

impl BugBuddy {
    /// Starts configuring a guard.
    #[must_use]
    pub fn builder() -> BugBuddyBuilder {
        BugBuddyBuilder::default()
    }

    /// The listener that files reports for this guard.
    #[must_use]
    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    /// Runs `runner` under the guard.
    ///
    /// On success the value is returned as is. On failure a report is filed;
    /// afterwards an `Err` is returned unchanged and a panic resumes unwinding
    /// with its original payload.
    ///
    /// Only panics produce a frame table in the report. A returned `Err` has
    /// already left the frames that produced it, so its report carries the
    /// error's rendering alone.
    ///
    /// # Errors
    ///
    /// Returns the runner's own error, or `E::from` a [`BugBuddyError`] when
    /// filing the report failed.
    pub fn run<T, E, F>(&self, runner: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: Debug + Display + From<BugBuddyError>,
    {
        let logger = self.listener.logger();
        logger.info(&format!("listening for {MASCOT}"));

        install_panic_hook();
        drop(take_panic_capture());
        let outcome = {
            let _scope = GuardScope::enter();
            panic::catch_unwind(AssertUnwindSafe(runner))
        };

        match outcome {
            Ok(Ok(value)) => {
                logger.debug(&format!("completed without {MASCOT}"));
                Ok(value)
            }
            Ok(Err(error)) => {
                let kind = exception_kind(&error);
                let trace = Trace::from_error(&kind, &error);
                match self.report(&trace, &kind) {
                    Ok(()) => Err(error),
                    Err(failure) => Err(E::from(failure)),
                }
            }
            Err(payload) => {
                let trace = match take_panic_capture() {
                    Some(capture) => Trace::from_panic(capture, self.listener.fs().as_ref()),
                    None => Trace::new(Vec::new(), format!("panicked:\n{}", payload_message(&*payload))),
                };
                match self.report(&trace, PANIC_KIND) {
                    Ok(()) => panic::resume_unwind(payload),
                    Err(failure) => Err(E::from(failure)),
                }
            }
        }
    }

    /// Turns the guard into a wrapper around a one-argument entry point.
    pub fn wrap<A, T, E, F>(self, runner: F) -> impl FnOnce(A) -> std::result::Result<T, E>
    where
        F: FnOnce(A) -> std::result::Result<T, E>,
        E: Debug + Display + From<BugBuddyError>,
    {
        move |arg| self.run(|| runner(arg))
    }

    fn report(&self, trace: &Trace, kind: &str) -> Result<()> {
        let resolved;
        let remote = match &self.remote {
            Some(client) => Some(client.as_ref()),
            None => {
                resolved = self.context.remote_client(self.listener.tracker())?;
                resolved.as_deref()
            }
        };

        let issue = self.listener.record(trace, kind, remote)?;

        let mut message = format!("{MASCOT} cached.");
        if self.listener.project_id().is_some() {
            message.push_str(&format!(
                " Tracking at {} issue {}.",
                self.listener.tracker(),
                issue.id()
            ));
        }
        self.listener.logger().info(&message);
        Ok(())
    }
}

/// Builder for [`BugBuddy`].
#[derive(Default)]
pub struct BugBuddyBuilder {
    project_id: Option<u64>,
    gitlab: bool,
    github: bool,
    context: Option<ServiceContext>,
    logger: Option<Arc<dyn Logger>>,
    fs: Option<Arc<dyn FileSystem>>,
    id_gen: Option<Arc<dyn IdGenerator>>,
    cache_path: Option<PathBuf>,
    remote: Option<Arc<dyn IssueTrackerClient>>,
}

impl BugBuddyBuilder {
    /// Remote project that receives reports.
    #[must_use]
    pub fn project_id(mut self, project_id: u64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Selects GitLab.
    #[must_use]
    pub fn gitlab(mut self) -> Self {
        self.gitlab = true;
        self
    }

    /// Selects GitHub.
    #[must_use]
    pub fn github(mut self) -> Self {
        self.github = true;
        self
    }

    /// Sets both tracker flags at once. Setting both fails at [`build`](Self::build).
    #[must_use]
    pub fn flags(mut self, gitlab: bool, github: bool) -> Self {
        self.gitlab = gitlab;
        self.github = github;
        self
    }

    /// Selects a tracker by kind.
    #[must_use]
    pub fn tracker(self, tracker: TrackerKind) -> Self {
        self.flags(tracker == TrackerKind::GitLab, tracker == TrackerKind::GitHub)
    }

    /// Uses `context` instead of one loaded from the environment.
    #[must_use]
    pub fn context(mut self, context: ServiceContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Overrides the log sink. Without one, a `tracing` subscriber is
    /// installed at the configured level when the guard is built.
    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Overrides the filesystem.
    #[must_use]
    pub fn fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Overrides the title ID generator.
    #[must_use]
    pub fn id_gen(mut self, id_gen: Arc<dyn IdGenerator>) -> Self {
        self.id_gen = Some(id_gen);
        self
    }

    /// Overrides the cache location.
    #[must_use]
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Files reports through `client` instead of resolving one from the tracker.
    #[must_use]
    pub fn remote(mut self, client: Arc<dyn IssueTrackerClient>) -> Self {
        self.remote = Some(client);
        self
    }

    /// Builds the guard.
    ///
    /// # Errors
    ///
    /// Returns [`BugBuddyError::Configuration`] when both trackers are
    /// selected, when a project ID is set without a tracker, or when the
    /// configured log level is unknown.
    pub fn build(self) -> Result<BugBuddy> {
        let tracker = TrackerKind::from_flags(self.gitlab, self.github)?;

        let mut context = self.context.unwrap_or_else(ServiceContext::live);
        match self.logger {
            Some(logger) => context.logger = logger,
            None => init_logging(&context.config.log_level)?,
        }
        if let Some(fs) = self.fs {
            context.fs = fs;
        }
        if let Some(id_gen) = self.id_gen {
            context.id_gen = id_gen;
        }
        if let Some(path) = self.cache_path {
            context.config.cache_path = path;
        }

        let listener = context.listener(self.project_id, tracker)?;
        Ok(BugBuddy { listener, context, remote: self.remote })
    }
}

/// Short name of the failure's type, used as the issue label.
///
/// For trait objects the leading identifier of the value's `Debug` output is
/// used instead.
pub fn exception_kind<E: Debug>(error: &E) -> String {
    let type_name = std::any::type_name::<E>();
    if type_name.contains("dyn ") {
        let debug = format!("{error:?}");
        let ident: String =
            debug.chars().take_while(|c| c.is_alphanumeric() || *c == '_').collect();
        if !ident.is_empty() {
            return ident;
        }
    }
    short_type_name(type_name).to_string()
}

fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Box<dyn Any>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct ValueError(#[allow(dead_code)] String);

    #[test]
    fn kind_is_short_type_name() {
        assert_eq!(exception_kind(&ValueError("x".into())), "ValueError");
        assert_eq!(exception_kind(&BugBuddyError::NoTrackerConfigured), "BugBuddyError");
        assert_eq!(exception_kind(&String::from("oops")), "String");
    }

    #[test]
    fn kind_strips_generics() {
        assert_eq!(short_type_name("core::option::Option<alloc::string::String>"), "Option");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn kind_of_trait_object_uses_debug_identifier() {
        let error: Box<dyn std::error::Error> =
            Box::new(std::fmt::Error);
        assert_eq!(exception_kind(&error), "Error");

        let error: Box<dyn Debug> = Box::new(ValueError("x".into()));
        assert_eq!(exception_kind(&error), "ValueError");
    }

    #[test]
    fn payload_message_handles_str_and_string() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(payload_message(&*payload), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(payload_message(&*payload), "bang");
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(payload_message(&*payload), "Box<dyn Any>");
    }

    #[test]
    fn both_trackers_are_rejected() {
        let result = BugBuddy::builder()
            .context(ServiceContext::with_config(crate::config::BugBuddyConfig::default()))
            .flags(true, true)
            .build();
        assert!(matches!(result, Err(BugBuddyError::Configuration(_))));
    }

    #[test]
    fn unknown_log_level_fails_without_injected_logger() {
        let mut config = crate::config::BugBuddyConfig::default();
        config.log_level = "loud".into();

        let result = BugBuddy::builder().context(ServiceContext::with_config(config)).build();

        assert!(matches!(result, Err(BugBuddyError::Configuration(_))));
    }

    #[test]
    fn injected_logger_skips_log_setup() {
        struct Quiet;
        impl Logger for Quiet {
            fn log(&self, _level: tracing::Level, _message: &str) {}
        }

        let mut config = crate::config::BugBuddyConfig::default();
        config.log_level = "loud".into();

        let result = BugBuddy::builder()
            .context(ServiceContext::with_config(config))
            .logger(Arc::new(Quiet))
            .build();

        assert!(result.is_ok());
    }

    #[test]
    fn project_without_tracker_is_rejected() {
        let result = BugBuddy::builder()
            .context(ServiceContext::with_config(crate::config::BugBuddyConfig::default()))
            .project_id(123)
            .build();
        assert!(matches!(result, Err(BugBuddyError::Configuration(_))));
    }
}

//! Command dispatch and handlers.

pub mod config;
pub mod issues;

use crate::cli::Command;
use crate::context::ServiceContext;
use crate::logging::init_logging;

/// Dispatch a parsed command to its handler.
///
/// Configuration is read from the environment and logging is initialized
/// before the handler runs.
///
/// # Errors
///
/// Returns an error string if logging cannot be set up or the selected
/// command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let ctx = ServiceContext::live();
    init_logging(&ctx.config.log_level).map_err(|e| e.to_string())?;
    dispatch_with_context(command, &ctx)
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Issues { project_id, iid, raw, gitlab, github } => {
            issues::run_with_context(ctx, *project_id, *iid, *raw, (*gitlab, *github))
        }
        Command::Config => config::run_with_context(ctx),
    }
}

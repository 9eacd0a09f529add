//! `bug-buddy config` command.

use std::env;

use crate::adapters::live::gitlab::GITLAB_TOKEN_VAR;
use crate::config::BugBuddyConfig;
use crate::context::ServiceContext;

/// Execute the `config` command.
///
/// # Errors
///
/// Currently infallible; returns `Result` for dispatch uniformity.
pub fn run_with_context(ctx: &ServiceContext) -> Result<(), String> {
    let token_set = env::var_os(GITLAB_TOKEN_VAR).is_some();
    print!("{}", render(&ctx.config, token_set));
    Ok(())
}

/// Renders the configuration, one `key: value` pair per line.
#[must_use]
pub fn render(config: &BugBuddyConfig, token_set: bool) -> String {
    format!(
        "log_level: {}\ncache_path: {}\ngitlab_url: {}\ngitlab_token: {}\n",
        config.log_level,
        config.cache_path.display(),
        config.gitlab_url,
        if token_set { "set" } else { "unset" },
    )
}

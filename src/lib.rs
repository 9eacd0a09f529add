//! Guard entry points and file their failures as issues on a remote tracker.
//!
//! ```no_run
//! use bug_buddy::{BugBuddy, BugBuddyError};
//!
//! #[derive(Debug)]
//! enum AppError {
//!     Failed(String),
//!     Reporting(BugBuddyError),
//! }
//!
//! impl std::fmt::Display for AppError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! impl From<BugBuddyError> for AppError {
//!     fn from(error: BugBuddyError) -> Self {
//!         Self::Reporting(error)
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let guarded = BugBuddy::builder()
//!         .project_id(123)
//!         .gitlab()
//!         .build()?
//!         .wrap(|name: String| -> Result<(), AppError> { Err(AppError::Failed(name)) });
//!     let _ = guarded("nightly".to_string());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod issue;
pub mod listener;
pub mod logging;
pub mod ports;
pub mod trace;
pub mod tracker;
mod wrapper;

pub use error::BugBuddyError;
pub use wrapper::{bug_buddy, exception_kind, BugBuddy, BugBuddyBuilder, PANIC_KIND};

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}

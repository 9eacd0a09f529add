//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `bug-buddy`.
#[derive(Debug, Parser)]
#[command(name = "bug-buddy", version, about = "Inspect issues filed by the bug guard")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List issues of a tracker project.
    Issues {
        /// Remote project ID.
        #[arg(long)]
        project_id: u64,
        /// Only fetch the issue with this project-scoped ID.
        #[arg(long)]
        iid: Option<u64>,
        /// Print tracker payloads unmodified as JSON.
        #[arg(long)]
        raw: bool,
        /// Use GitLab.
        #[arg(long, conflicts_with = "github")]
        gitlab: bool,
        /// Use GitHub.
        #[arg(long)]
        github: bool,
    },
    /// Print the resolved configuration.
    Config,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_config_subcommand() {
        let cli = Cli::parse_from(["bug-buddy", "config"]);
        assert!(matches!(cli.command, Command::Config));
    }

    #[test]
    fn parses_issues_subcommand() {
        let cli = Cli::parse_from([
            "bug-buddy",
            "issues",
            "--project-id",
            "123",
            "--iid",
            "4",
            "--gitlab",
        ]);
        match cli.command {
            Command::Issues { project_id, iid, raw, gitlab, github } => {
                assert_eq!(project_id, 123);
                assert_eq!(iid, Some(4));
                assert!(!raw);
                assert!(gitlab);
                assert!(!github);
            }
            Command::Config => panic!("expected issues subcommand"),
        }
    }

    #[test]
    fn issues_requires_project_id() {
        assert!(Cli::try_parse_from(["bug-buddy", "issues"]).is_err());
    }

    #[test]
    fn trackers_conflict() {
        let result = Cli::try_parse_from([
            "bug-buddy",
            "issues",
            "--project-id",
            "1",
            "--gitlab",
            "--github",
        ]);
        assert!(result.is_err());
    }
}

//! Binary entrypoint for the `bug-buddy` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match bug_buddy::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

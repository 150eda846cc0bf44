//! `taskmasterctl` entrypoint.
//!
//! Delegates to [`taskmaster_cli::run`], which loads configuration, validates
//! the command and streams the daemon's response to stdout.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    taskmaster_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}

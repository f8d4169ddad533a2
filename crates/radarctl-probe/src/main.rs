//! Entrypoint for the radar control channel probe.
//!
//! Delegates to [`radarctl_probe::run`], which loads configuration, sends the
//! command token to the resolved service, and streams the reply to stdout.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    radarctl_probe::run(std::env::args_os(), &mut stdout, &mut stderr)
}

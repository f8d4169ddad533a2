//! Command-line interface for the control channel probe.

use std::process::ExitCode;

use clap::{Parser, ValueEnum};

/// Command sent when `--command` is not given.
pub const DEFAULT_COMMAND: &str = "health";

/// Exit status reported when the probe fails after argument parsing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OnError {
    /// Exit with status 1.
    #[default]
    Failure,
    /// Exit with status 0 so supervisors that only check the status treat a
    /// failed probe as inconclusive.
    Success,
}

impl OnError {
    pub(crate) fn exit_code(self) -> ExitCode {
        match self {
            Self::Failure => ExitCode::FAILURE,
            Self::Success => ExitCode::SUCCESS,
        }
    }
}

/// Sends one command to a radar control service and copies the reply to
/// standard output.
#[derive(Parser, Debug)]
#[command(name = "radarctl-probe", version)]
pub(crate) struct Cli {
    /// Host running the control service.
    #[arg(value_name = "HOST")]
    pub(crate) host: String,
    /// Command token to send.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_COMMAND)]
    pub(crate) command: String,
    /// Exit status used when connecting or reading the reply fails.
    #[arg(long, value_enum, default_value_t = OnError::Failure)]
    pub(crate) on_error: OnError,
}

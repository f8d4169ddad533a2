//! Control channel probe for the radar control service.
//!
//! The probe resolves the well-known service name into a port, connects to
//! the given host, sends a single command token (`health` unless `--command`
//! names another), and copies the unframed reply to standard output until the
//! service closes the connection.
//!
//! Configuration flags shared with the daemon (`--service-name`,
//! `--services-path`, `--connect-timeout-ms`, and friends) must precede the
//! host; see [`radarctl_config::Config`] for the full set.

mod cli;
mod config;
mod errors;
mod transport;

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use radarctl_config::{Config, resolve_service_port};

pub use cli::{DEFAULT_COMMAND, OnError};

pub(crate) use cli::Cli;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader, probe_arguments, split_config_arguments};
pub(crate) use errors::AppError;

/// Output handles used by the probe.
pub(crate) struct IoStreams<'a, W, E>
where
    W: Write,
    E: Write,
{
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W, E> IoStreams<'a, W, E>
where
    W: Write,
    E: Write,
{
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Drives one probe invocation: argument parsing, configuration loading, and
/// the exchange with the service.
pub(crate) struct CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    pub(crate) fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    pub(crate) fn run<I>(self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let cli = match Cli::try_parse_from(probe_arguments(&args, &split)) {
            Ok(cli) => cli,
            Err(error) => return self.report_usage(error),
        };

        let result = self
            .loader
            .load(&split.config_arguments)
            .and_then(|config| probe(&cli, &config, &mut *self.io.stdout));

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                if error.is_probe_failure() {
                    cli.on_error.exit_code()
                } else {
                    ExitCode::FAILURE
                }
            }
        }
    }

    /// Help and version requests go to stdout and succeed; every other parse
    /// failure is a usage error.
    fn report_usage(self, error: clap::Error) -> ExitCode {
        if error.use_stderr() {
            let _ = write!(self.io.stderr, "{}", AppError::CliUsage(error));
            ExitCode::FAILURE
        } else {
            let _ = write!(self.io.stdout, "{error}");
            ExitCode::SUCCESS
        }
    }
}

fn probe<W>(cli: &Cli, config: &Config, stdout: &mut W) -> Result<(), AppError>
where
    W: Write,
{
    let port = resolve_service_port(config).map_err(|source| AppError::UnknownService {
        service: config.service_name().to_owned(),
        source,
    })?;
    let mut stream = transport::connect(&cli.host, port, config.connect_timeout())?;
    stream
        .set_read_timeout(config.read_timeout())
        .map_err(AppError::ConfigureStream)?;
    transport::exchange(&mut stream, &cli.command, stdout)?;
    Ok(())
}

/// Runs the probe using the provided arguments and output handles.
///
/// Returns exit status 0 when the reply was copied in full, 1 on a usage or
/// configuration error, and 1 (or 0 with `--on-error success`) when resolving,
/// connecting, or reading fails.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the probe with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<'a, I, W, E, L>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}

#[cfg(test)]
mod tests;

//! Commands every control service answers regardless of the instrument.
//!
//! `status` and `commands` describe the registry they live in, so they hold a
//! weak handle back to it. [`CommandRegistry::with_builtins`] ties the knot.

use std::io::Write;
use std::sync::{Arc, Weak};
use std::time::Instant;

use serde::Serialize;

use crate::command::{Command, CommandError};
use crate::dispatch::{CommandRegistry, RegistryError, SessionCounts, SessionStats};

/// Name of the liveness command the probe sends.
pub const HEALTH_COMMAND: &str = "health";
/// Name of the structured status command.
pub const STATUS_COMMAND: &str = "status";
/// Name of the command listing command.
pub const COMMANDS_COMMAND: &str = "commands";

/// Replies `ok` while the service is accepting sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthCommand;

impl Command for HealthCommand {
    fn name(&self) -> &str {
        HEALTH_COMMAND
    }

    fn execute(&self, output: &mut dyn Write) -> Result<(), CommandError> {
        output.write_all(b"ok\n")?;
        Ok(())
    }
}

/// Replies with one JSON document describing the running service.
#[derive(Debug)]
pub struct StatusCommand {
    catalogue: Weak<CommandRegistry>,
    stats: Arc<SessionStats>,
    started: Instant,
}

#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    state: &'static str,
    uptime_secs: u64,
    sessions: SessionCounts,
    commands: Vec<&'a str>,
}

impl Command for StatusCommand {
    fn name(&self) -> &str {
        STATUS_COMMAND
    }

    fn execute(&self, output: &mut dyn Write) -> Result<(), CommandError> {
        let registry = upgrade(&self.catalogue)?;
        let report = StatusReport {
            state: "ready",
            uptime_secs: self.started.elapsed().as_secs(),
            sessions: self.stats.snapshot(),
            commands: registry.names().collect(),
        };
        serde_json::to_writer(&mut *output, &report)?;
        output.write_all(b"\n")?;
        Ok(())
    }
}

/// Replies with one registered command name per line.
#[derive(Debug)]
pub struct CommandsCommand {
    catalogue: Weak<CommandRegistry>,
}

impl Command for CommandsCommand {
    fn name(&self) -> &str {
        COMMANDS_COMMAND
    }

    fn execute(&self, output: &mut dyn Write) -> Result<(), CommandError> {
        let registry = upgrade(&self.catalogue)?;
        for name in registry.names() {
            writeln!(output, "{name}")?;
        }
        Ok(())
    }
}

fn upgrade(catalogue: &Weak<CommandRegistry>) -> Result<Arc<CommandRegistry>, CommandError> {
    catalogue
        .upgrade()
        .ok_or_else(|| CommandError::failed("command registry is no longer available"))
}

/// Builds a shared registry holding the built-ins followed by `extra`.
pub(crate) fn preload(
    extra: CommandRegistry,
    stats: Arc<SessionStats>,
) -> Result<Arc<CommandRegistry>, RegistryError> {
    let started = Instant::now();
    let mut outcome = Ok(());
    let registry = Arc::new_cyclic(|catalogue: &Weak<CommandRegistry>| {
        let mut registry = CommandRegistry::new();
        outcome = populate(&mut registry, catalogue, stats, started, extra);
        registry
    });
    outcome.map(|()| registry)
}

fn populate(
    registry: &mut CommandRegistry,
    catalogue: &Weak<CommandRegistry>,
    stats: Arc<SessionStats>,
    started: Instant,
    extra: CommandRegistry,
) -> Result<(), RegistryError> {
    registry.register(HealthCommand)?;
    registry.register(StatusCommand {
        catalogue: Weak::clone(catalogue),
        stats,
        started,
    })?;
    registry.register(CommandsCommand {
        catalogue: Weak::clone(catalogue),
    })?;
    for command in extra.into_commands() {
        registry.add(command)?;
    }
    Ok(())
}

//! Name-to-command lookup table.
//!
//! The registry is populated once during bootstrap and shared read-only with
//! every session afterwards. Lookup is total: a name resolves to exactly one
//! command or fails with [`DispatchError::UnknownCommand`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::builtins;
use crate::command::Command;

use super::errors::DispatchError;
use super::stats::SessionStats;

/// Errors raised while populating a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A command with the same name is already registered.
    #[error("command '{name}' is already registered")]
    DuplicateCommand { name: String },
}

/// Registered commands in insertion order, indexed by exact name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a shared command.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`] when a command with the same
    /// name is already present; the registry is left unchanged.
    pub fn add(&mut self, command: Arc<dyn Command>) -> Result<(), RegistryError> {
        let name = command.name().to_owned();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateCommand { name });
        }
        self.index.insert(name, self.commands.len());
        self.commands.push(command);
        Ok(())
    }

    /// Inserts an owned command.
    ///
    /// # Errors
    ///
    /// See [`CommandRegistry::add`].
    pub fn register<C>(&mut self, command: C) -> Result<(), RegistryError>
    where
        C: Command + 'static,
    {
        self.add(Arc::new(command))
    }

    /// Resolves `name` to its command using an exact, case-sensitive match.
    ///
    /// The registry keeps its own handle; the returned one stays valid for as
    /// long as the caller holds it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownCommand`] when nothing is registered
    /// under `name`.
    pub fn find(&self, name: &str) -> Result<Arc<dyn Command>, DispatchError> {
        self.index
            .get(name)
            .and_then(|position| self.commands.get(*position))
            .map(Arc::clone)
            .ok_or_else(|| DispatchError::unknown_command(name))
    }

    /// Returns true when a command is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|command| command.name())
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true when no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Freezes the registry for sharing with sessions, preloading the
    /// `health`, `status`, and `commands` built-ins ahead of the commands
    /// already registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`] when a registered command
    /// clashes with a built-in name.
    pub fn with_builtins(self, stats: Arc<SessionStats>) -> Result<Arc<Self>, RegistryError> {
        builtins::preload(self, stats)
    }

    pub(crate) fn into_commands(self) -> impl Iterator<Item = Arc<dyn Command>> {
        self.commands.into_iter()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CommandRegistry")
            .field("commands", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::StaticReply;
    use rstest::{fixture, rstest};

    #[fixture]
    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry
            .register(StaticReply::new("health", "ok\n"))
            .expect("register health");
        registry
            .register(StaticReply::new("status", "ready\n"))
            .expect("register status");
        registry
    }

    fn reply_of(command: &Arc<dyn Command>) -> Vec<u8> {
        let mut output = Vec::new();
        command.execute(&mut output).expect("execute");
        output
    }

    #[rstest]
    fn finds_every_registered_command(registry: CommandRegistry) {
        for name in ["health", "status"] {
            let command = registry.find(name).expect("registered command");
            assert_eq!(command.name(), name);
        }
    }

    #[rstest]
    fn resolves_to_the_matching_handler(registry: CommandRegistry) {
        let health = registry.find("health").expect("health");
        let status = registry.find("status").expect("status");
        assert_eq!(reply_of(&health), b"ok\n");
        assert_eq!(reply_of(&status), b"ready\n");
    }

    #[rstest]
    #[case("STATUS")]
    #[case("Health")]
    #[case("health ")]
    #[case("")]
    #[case("calibrate")]
    fn rejects_names_without_exact_match(registry: CommandRegistry, #[case] name: &str) {
        let result = registry.find(name);
        assert!(
            matches!(result, Err(DispatchError::UnknownCommand { name: ref missing }) if missing == name),
            "expected unknown command for {name:?}"
        );
    }

    #[test]
    fn empty_registry_rejects_every_lookup() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        for name in ["health", "status", ""] {
            assert!(matches!(
                registry.find(name),
                Err(DispatchError::UnknownCommand { .. })
            ));
        }
    }

    #[rstest]
    fn rejects_duplicate_names(mut registry: CommandRegistry) {
        let error = registry
            .register(StaticReply::new("health", "again\n"))
            .expect_err("duplicate must be rejected");
        assert!(matches!(error, RegistryError::DuplicateCommand { ref name } if name == "health"));
        assert_eq!(registry.len(), 2);
        let health = registry.find("health").expect("health");
        assert_eq!(reply_of(&health), b"ok\n");
    }

    #[rstest]
    fn lists_names_in_insertion_order(mut registry: CommandRegistry) {
        registry
            .register(StaticReply::new("abort", "stopped\n"))
            .expect("register abort");
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, ["health", "status", "abort"]);
    }

    #[test]
    fn lookups_share_the_registered_instance() {
        let mut registry = CommandRegistry::new();
        let command: Arc<dyn Command> = Arc::new(StaticReply::new("health", "ok\n"));
        registry.add(Arc::clone(&command)).expect("add");
        let found = registry.find("health").expect("find");
        assert!(Arc::ptr_eq(&command, &found));
    }

    #[test]
    fn n_lookups_succeed_and_one_fails() {
        let mut registry = CommandRegistry::new();
        let names: Vec<String> = (0..16).map(|index| format!("cmd-{index}")).collect();
        for name in &names {
            registry
                .register(StaticReply::new(name.clone(), name.clone()))
                .expect("register");
        }
        for name in &names {
            let command = registry.find(name).expect("find");
            assert_eq!(reply_of(&command), name.as_bytes());
        }
        assert!(registry.find("cmd-16").is_err());
    }
}

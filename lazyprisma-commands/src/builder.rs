//! Fluent construction of commands

use crate::command::Command;
use crate::platform::Platform;

/// Creates [`Command`] values bound to a platform configuration
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    platform: Platform,
}

impl CommandBuilder {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Create a command from an argv slice.
    ///
    /// # Panics
    ///
    /// Panics when `argv` is empty; a command needs at least a program name.
    pub fn command(&self, argv: &[&str]) -> Command {
        assert!(!argv.is_empty(), "command requires at least one argument");
        Command::new(
            argv[0].to_string(),
            argv[1..].iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create a command that runs a string through the platform shell
    pub fn shell(&self, command_line: &str) -> Command {
        let (shell, shell_arg) = self.platform.shell();
        Command::new(
            shell.to_string(),
            vec![shell_arg.to_string(), command_line.to_string()],
        )
    }
}

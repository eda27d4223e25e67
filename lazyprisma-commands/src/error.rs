//! Command execution error types

use thiserror::Error;

/// Errors that can occur while running an external command
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be spawned (missing binary, permissions, ...)
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited with a nonzero status
    #[error("command exited with status {0}")]
    ExitStatus(i32),

    /// Waiting on the process failed after it was started
    #[error("failed to wait for process: {0}")]
    Wait(std::io::Error),

    /// The process has not been started yet, so there is nothing to signal
    #[error("process has not started")]
    NotStarted,

    /// Sending a signal to the process group failed
    #[error("failed to kill process group {pid}: {message}")]
    Kill { pid: i32, message: String },
}

//! CLI-specific error types

use thiserror::Error;

/// Errors that can occur in the coordinator and frontend
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error (workspace, schema, engine)
    #[error(transparent)]
    Core(#[from] lazyprisma_core::CoreError),

    /// Database layer error
    #[error(transparent)]
    Db(#[from] lazyprisma_db::DbError),

    /// Subprocess error
    #[error(transparent)]
    Command(#[from] lazyprisma_commands::CommandError),

    /// Readline/input error
    #[error("input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// IO error (filesystem, stdout)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),
}

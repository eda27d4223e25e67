//! Core error types

use std::path::PathBuf;
use thiserror::Error;

fn path_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn fragment(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("<none>")
}

/// Errors from workspace detection, schema parsing, and the migration engine
#[derive(Debug, Error)]
pub enum CoreError {
    /// The directory holds neither project format
    #[error("not a Prisma workspace (searched: {})", path_list(.searched))]
    NotAWorkspace { searched: Vec<PathBuf> },

    /// The schema file itself is missing
    #[error("schema file not found: {0}")]
    SchemaNotFound(PathBuf),

    /// Parsing finished without finding a provider or a url expression.
    /// Carries what was recognised so the user can see how far parsing got.
    #[error(
        "incomplete datasource configuration (provider: {}, url: {})",
        fragment(.provider),
        fragment(.url_expr)
    )]
    SchemaIncomplete {
        provider: Option<String>,
        url_expr: Option<String>,
    },

    /// The url references an environment variable that is set nowhere in the
    /// search order
    #[error("environment variable '{0}' is not configured")]
    EnvNotResolved(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Db(#[from] lazyprisma_db::DbError),

    #[error(transparent)]
    Command(#[from] lazyprisma_commands::CommandError),
}

//! Startup status aggregate

use crate::cli::PrismaCli;
use crate::datasource::{self, resolve_datasource};
use crate::migrations::{scan_local_migrations, Migration};
use crate::schema::{parse_schema_file, SchemaInfo};
use crate::workspace::{detect_workspace, schema_path, WorkspaceKind};
use std::path::Path;

/// Everything the frontend needs to know about a project at startup.
///
/// All fields are best-effort; a missing CLI or unreachable database shows
/// up as `false` / `None` rather than an error.
#[derive(Debug, Clone, Default)]
pub struct Status {
    pub cli_available: bool,
    pub version: Option<String>,
    pub is_global: bool,
    pub workspace: Option<WorkspaceKind>,
    pub schema: SchemaInfo,
    /// Fully resolved database URL (unmasked)
    pub database_url: Option<String>,
    /// Why url resolution failed, when it did
    pub datasource_error: Option<String>,
    pub migrations: Vec<Migration>,
}

impl Status {
    /// The database URL with its password replaced for display
    pub fn masked_url(&self) -> Option<String> {
        self.database_url
            .as_deref()
            .map(datasource::mask_password)
    }
}

/// Gather the status aggregate for a project directory
pub async fn get_status(project_dir: &Path) -> Status {
    let mut status = Status {
        workspace: detect_workspace(project_dir),
        ..Status::default()
    };

    let cli = PrismaCli::new(project_dir);
    if let Ok(info) = cli.version().await {
        status.cli_available = true;
        status.version = Some(info.version);
        status.is_global = info.is_global;
    }

    if status.workspace.is_none() {
        return status;
    }

    if let Ok(schema) = parse_schema_file(&schema_path(project_dir)) {
        status.schema = schema;
    }

    match resolve_datasource(project_dir) {
        Ok(ds) => status.database_url = Some(ds.url),
        Err(err) => status.datasource_error = Some(err.to_string()),
    }

    status.migrations = scan_local_migrations(project_dir).unwrap_or_default();
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_url_hides_password() {
        let status = Status {
            database_url: Some("postgres://app:secret@db/x".to_string()),
            ..Status::default()
        };
        assert_eq!(
            status.masked_url().as_deref(),
            Some("postgres://app:****@db/x")
        );
    }

    #[test]
    fn masked_url_absent_when_unresolved() {
        assert_eq!(Status::default().masked_url(), None);
    }
}

//! Workspace detection
//!
//! Two project formats exist. Current projects carry a `prisma.config.ts` at
//! the root; legacy projects carry `prisma/schema.prisma`. Detection is a
//! plain filesystem existence check.

use crate::error::CoreError;
use std::path::{Path, PathBuf};

/// Config file of current-format projects
pub const CONFIG_FILE_NAME: &str = "prisma.config.ts";

/// Schema location of legacy-format projects
pub const SCHEMA_DIR_NAME: &str = "prisma";
pub const SCHEMA_FILE_NAME: &str = "schema.prisma";

/// Which project format a directory holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceKind {
    /// `prisma.config.ts` at the project root
    Current,
    /// `prisma/schema.prisma`
    Legacy,
}

/// Path to the config file of a current-format project
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Path to the schema file (used by both formats for the provider)
pub fn schema_path(dir: &Path) -> PathBuf {
    dir.join(SCHEMA_DIR_NAME).join(SCHEMA_FILE_NAME)
}

/// Detect the workspace format, if any. The config file wins when both exist.
pub fn detect_workspace(dir: &Path) -> Option<WorkspaceKind> {
    if config_path(dir).is_file() {
        return Some(WorkspaceKind::Current);
    }
    if schema_path(dir).is_file() {
        return Some(WorkspaceKind::Legacy);
    }
    None
}

/// Like [`detect_workspace`], but reports the searched paths on failure
pub fn require_workspace(dir: &Path) -> Result<WorkspaceKind, CoreError> {
    detect_workspace(dir).ok_or_else(|| CoreError::NotAWorkspace {
        searched: vec![config_path(dir), schema_path(dir)],
    })
}

//! Outbound message types
//!
//! The coordinator never touches frontend state. Everything the frontend
//! needs to render travels as a [`UiEvent`] over an unbounded channel; the
//! frontend's receive loop is the single place collaborator state mutates.

use lazyprisma_core::cli::ResolveKind;
use lazyprisma_core::{Datasource, MigrationCategory};
use std::path::PathBuf;
use std::sync::Arc;

/// Styling of a log action entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    Normal,
    Red,
}

/// Styling of a modal dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalStyle {
    Info,
    Success,
    Warning,
    Error,
}

/// Token identifying what an answered modal should trigger.
///
/// Carried on modal requests that expect an answer; the frontend echoes it
/// back through [`crate::Coordinator::modal_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    /// Pending migrations exist; continuing will apply them first
    ConfirmPendingBeforeCreate,
    /// Prompt for the name of a schema-diff migration
    EnterMigrationName,
    /// Prompt for the name of a manually authored migration
    EnterManualMigrationName,
    /// Confirm removal of a local migration directory
    ConfirmDelete { name: String, path: PathBuf },
    /// Choose how to resolve a failed migration
    ChooseResolve { name: String },
    /// Confirm a destructive `migrate reset`
    ConfirmReset,
}

/// The frontend's answer to a modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalInput {
    Confirmed,
    Cancelled,
    Text(String),
    Resolve(ResolveKind),
}

/// A modal dialog request
#[derive(Debug, Clone)]
pub struct ModalRequest {
    pub title: String,
    pub body: Vec<String>,
    pub style: ModalStyle,
    /// Present when the modal expects an answer
    pub action: Option<ModalAction>,
}

impl ModalRequest {
    pub fn message(title: impl Into<String>, body: Vec<String>, style: ModalStyle) -> Self {
        Self {
            title: title.into(),
            body,
            style,
            action: None,
        }
    }

    pub fn with_action(mut self, action: ModalAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// Immutable workspace state, replaced wholesale on every refresh
#[derive(Debug, Clone, Default)]
pub struct WorkspaceSnapshot {
    pub datasource: Option<Datasource>,
    /// Why datasource resolution or the connection failed, when it did
    pub datasource_error: Option<String>,
    /// Resolved URL with credentials masked, for display
    pub masked_url: Option<String>,
    pub category: MigrationCategory,
    pub db_connected: bool,
    pub table_exists: bool,
}

/// Messages from the coordinator to the frontend
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// A fresh categorisation was published
    Snapshot(Arc<WorkspaceSnapshot>),
    /// Append a structured entry to the output log
    LogAction {
        title: String,
        details: Vec<String>,
        style: LogStyle,
    },
    /// One line of streamed subprocess output
    CommandOutput(String),
    OpenModal(ModalRequest),
    CloseModal,
    /// The ancillary Studio process started or stopped
    StudioChanged { running: bool, url: Option<String> },
    /// Spinner frame advanced while a command is running
    Tick,
}

impl UiEvent {
    pub fn log(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::LogAction {
            title: title.into(),
            details: vec![detail.into()],
            style: LogStyle::Normal,
        }
    }

    pub fn log_red(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::LogAction {
            title: title.into(),
            details: vec![detail.into()],
            style: LogStyle::Red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_modal_has_no_action() {
        let modal = ModalRequest::message("Title", vec!["line".to_string()], ModalStyle::Info);
        assert!(modal.action.is_none());
    }

    #[test]
    fn with_action_attaches_token() {
        let modal = ModalRequest::message("Delete?", vec![], ModalStyle::Warning)
            .with_action(ModalAction::ConfirmReset);
        assert_eq!(modal.action, Some(ModalAction::ConfirmReset));
    }

    #[test]
    fn log_helpers_set_style() {
        match UiEvent::log_red("t", "d") {
            UiEvent::LogAction { style, .. } => assert_eq!(style, LogStyle::Red),
            _ => unreachable!(),
        }
    }
}

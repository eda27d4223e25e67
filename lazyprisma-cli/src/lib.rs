//! Workflow coordination for lazyprisma
//!
//! This crate owns the user-facing action set:
//! - [`gate`]: the process-wide one-command-at-a-time admission control and
//!   its spinner ticker
//! - [`events`]: the outbound message types the frontend renders
//! - [`coordinator`]: per-action preconditions and state transitions
//! - [`config`]: the application config file
//! - [`repl`]: a thin line-oriented frontend

pub mod config;
pub mod coordinator;
mod error;
pub mod events;
pub mod gate;
pub mod repl;

pub use config::AppConfig;
pub use coordinator::Coordinator;
pub use error::CliError;
pub use events::{
    LogStyle, ModalAction, ModalInput, ModalRequest, ModalStyle, UiEvent, WorkspaceSnapshot,
};
pub use gate::{CommandGate, SpinnerTicker, SPINNER_FRAMES};

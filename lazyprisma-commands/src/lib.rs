//! Subprocess execution for lazyprisma
//!
//! This crate provides:
//! - Platform shell detection ([`Platform`])
//! - A fluent command builder ([`CommandBuilder`], [`Command`]) with four
//!   execution modes: blocking, blocking-with-capture, async, and async
//!   streaming with per-line callbacks
//! - Process-group termination ([`KillSwitch`]) so a command's whole subtree
//!   can be killed even after it has forked further children

mod builder;
mod command;
mod error;
mod platform;
mod runner;

pub use builder::CommandBuilder;
pub use command::{Command, CommandResult, KillSwitch};
pub use error::CommandError;
pub use platform::Platform;

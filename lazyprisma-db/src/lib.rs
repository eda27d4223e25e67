//! Database access for lazyprisma
//!
//! A small driver layer over sqlx:
//! - [`Registry`] maps provider names to driver factories; registration is an
//!   explicit startup step ([`register_builtin_drivers`]), not an import-time
//!   side effect
//! - [`DbDriver`] is the strategy interface each backend implements
//!   (postgres, mysql, sqlite)
//! - [`translate_url`] rewrites schema-level database URLs into the form the
//!   native driver accepts
//! - [`Client`] ties it together: translate, look up, open, ping

mod client;
mod config;
mod driver;
pub mod drivers;
mod error;
mod provider;
mod registry;
mod url;

pub use client::Client;
pub use config::Config;
pub use driver::{DbDriver, HistoryRow};
pub use error::DbError;
pub use provider::{display_name, driver_name};
pub use registry::{get, has, list, register, register_builtin_drivers, DriverFactory, Registry};
pub use url::translate_url;

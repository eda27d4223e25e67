//! Core domain logic for lazyprisma
//!
//! Everything that understands a Prisma project lives here:
//! - [`workspace`]: which of the two project formats (config-file or
//!   schema-file) a directory holds
//! - [`schema`]: tolerant line-oriented parsing of the schema DSL
//! - [`datasource`]: provider + database-URL resolution, including the
//!   ordered environment-variable search and URL masking
//! - [`migrations`]: the state engine that reconciles local migration
//!   directories with the database's migration-history table
//! - [`cli`]: argv construction and probes for the external Prisma CLI
//! - [`status`]: the startup aggregate

pub mod cli;
pub mod datasource;
pub mod dotenv;
mod error;
pub mod migrations;
pub mod schema;
pub mod status;
pub mod workspace;

pub use datasource::{mask_password, resolve_datasource, Datasource};
pub use error::CoreError;
pub use migrations::{
    categorize, compare_migrations, scan_local_migrations, EngineOutcome, Migration,
    MigrationCategory, HISTORY_QUERY, HISTORY_TABLE,
};
pub use schema::{parse_schema, SchemaInfo, UrlExpr};
pub use status::{get_status, Status};
pub use workspace::{detect_workspace, require_workspace, WorkspaceKind};

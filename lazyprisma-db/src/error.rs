//! Database layer error types

use thiserror::Error;

/// Errors from driver registration and connection handling.
///
/// The variants distinguish the stages of opening a connection from a schema
/// URL: registry lookup, URL translation, open, and ping. Query errors only
/// occur after a successful open.
#[derive(Debug, Error)]
pub enum DbError {
    /// No driver is registered under the requested name
    #[error("driver '{name}' is not registered (available: {})", .registered.join(", "))]
    DriverNotRegistered {
        name: String,
        registered: Vec<String>,
    },

    /// A driver with this name already exists in the registry
    #[error("driver '{0}' is already registered")]
    AlreadyRegistered(String),

    /// The database URL could not be parsed or translated
    #[error("invalid database url: {0}")]
    UrlParse(String),

    /// Opening the connection failed
    #[error("failed to open connection: {0}")]
    Open(String),

    /// The connection opened but the server did not answer a ping
    #[error("ping failed: {0}")]
    Ping(String),

    /// A query failed after a successful connection
    #[error("query failed: {0}")]
    Query(String),

    /// The driver has not been connected yet
    #[error("not connected")]
    NotConnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_registered_lists_available_drivers() {
        let err = DbError::DriverNotRegistered {
            name: "mongodb".to_string(),
            registered: vec!["mysql".to_string(), "postgres".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("mongodb"));
        assert!(msg.contains("mysql, postgres"));
    }

    #[test]
    fn ping_display() {
        assert_eq!(
            DbError::Ping("timed out".to_string()).to_string(),
            "ping failed: timed out"
        );
    }
}

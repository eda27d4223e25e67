//! Provider name handling

/// Maps a schema-level provider name to the registered driver name.
///
/// CockroachDB speaks the postgres protocol; unknown providers map to
/// themselves so a custom registration can still resolve.
pub fn driver_name(provider: &str) -> &str {
    match provider.to_ascii_lowercase().as_str() {
        "postgresql" | "postgres" | "cockroachdb" => "postgres",
        "mysql" => "mysql",
        "sqlite" => "sqlite",
        "sqlserver" => "sqlserver",
        _ => provider,
    }
}

/// Human-readable provider name for display
pub fn display_name(provider: &str) -> &'static str {
    if provider.is_empty() {
        return "Not specified";
    }
    match provider.to_ascii_lowercase().as_str() {
        "postgresql" | "postgres" => "PostgreSQL",
        "mysql" => "MySQL",
        "sqlite" => "SQLite",
        "sqlserver" => "SQL Server",
        "mongodb" => "MongoDB",
        "cockroachdb" => "CockroachDB",
        _ => "Unknown",
    }
}

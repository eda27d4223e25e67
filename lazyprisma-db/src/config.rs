//! Connection configuration builder

use std::collections::BTreeMap;

/// Database connection configuration.
///
/// A builder with per-provider DSN renderings. Extra options are kept in a
/// sorted map so DSN output is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
    pub extra: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 0,
            user: String::new(),
            password: String::new(),
            database: String::new(),
            ssl_mode: "disable".to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// SSL mode: disable, prefer, require, verify-ca, verify-full
    pub fn ssl_mode(mut self, mode: impl Into<String>) -> Self {
        self.ssl_mode = mode.into();
        self
    }

    /// Add a provider-specific option
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The port, falling back to the given provider default when unset
    pub fn port_or(&self, default: u16) -> u16 {
        if self.port == 0 {
            default
        } else {
            self.port
        }
    }

    /// PostgreSQL keyword/value connection string
    pub fn postgres_dsn(&self) -> String {
        let mut dsn = format!(
            "host={} port={} user={} password={} dbname={} sslmode={}",
            self.host,
            self.port_or(5432),
            self.user,
            self.password,
            self.database,
            self.ssl_mode
        );
        for (key, value) in &self.extra {
            dsn.push_str(&format!(" {}={}", key, value));
        }
        dsn
    }

    /// MySQL URL-form connection string
    pub fn mysql_dsn(&self) -> String {
        let mut dsn = format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user,
            self.password,
            self.host,
            self.port_or(3306),
            self.database
        );

        let mut params = Vec::new();
        if !self.ssl_mode.is_empty() && self.ssl_mode != "disable" {
            params.push(format!("ssl-mode={}", self.ssl_mode));
        }
        for (key, value) in &self.extra {
            params.push(format!("{}={}", key, value));
        }
        if !params.is_empty() {
            dsn.push('?');
            dsn.push_str(&params.join("&"));
        }
        dsn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_dsn_includes_all_fields() {
        let cfg = Config::new()
            .host("db.internal")
            .port(5433)
            .user("app")
            .password("secret")
            .database("main")
            .ssl_mode("require");
        assert_eq!(
            cfg.postgres_dsn(),
            "host=db.internal port=5433 user=app password=secret dbname=main sslmode=require"
        );
    }

    #[test]
    fn postgres_dsn_appends_extra_options_sorted() {
        let cfg = Config::new()
            .user("u")
            .database("d")
            .extra("z_option", "1")
            .extra("a_option", "2");
        let dsn = cfg.postgres_dsn();
        let a = dsn.find("a_option=2").unwrap();
        let z = dsn.find("z_option=1").unwrap();
        assert!(a < z);
    }

    #[test]
    fn postgres_dsn_default_port() {
        let cfg = Config::new().user("u").database("d");
        assert!(cfg.postgres_dsn().contains("port=5432"));
    }

    #[test]
    fn mysql_dsn_default_port_and_no_params() {
        let cfg = Config::new().user("root").password("pw").database("app");
        assert_eq!(cfg.mysql_dsn(), "mysql://root:pw@localhost:3306/app");
    }

    #[test]
    fn mysql_dsn_with_ssl_and_extra() {
        let cfg = Config::new()
            .user("root")
            .password("pw")
            .database("app")
            .ssl_mode("require")
            .extra("charset", "utf8mb4");
        assert_eq!(
            cfg.mysql_dsn(),
            "mysql://root:pw@localhost:3306/app?ssl-mode=require&charset=utf8mb4"
        );
    }
}

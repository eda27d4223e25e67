//! High-level database client

use crate::config::Config;
use crate::driver::{DbDriver, HistoryRow};
use crate::error::DbError;
use crate::provider::driver_name;
use crate::registry;
use crate::url::translate_url;

/// A connected database client bound to one driver instance.
///
/// Opened per refresh and closed before the refresh returns; never shared.
#[derive(Debug)]
pub struct Client {
    driver: Box<dyn DbDriver>,
    provider: String,
}

impl Client {
    /// Open a connection from a schema-level `(provider, url)` pair.
    ///
    /// Combines URL translation, registry lookup, open, and ping. The error
    /// kind identifies which stage failed: [`DbError::DriverNotRegistered`],
    /// [`DbError::UrlParse`], [`DbError::Open`], or [`DbError::Ping`].
    pub async fn from_schema_url(provider: &str, url: &str) -> Result<Self, DbError> {
        let name = driver_name(provider);
        let native_url = translate_url(provider, url)?;
        let mut driver = registry::get(name)?;
        driver.connect_url(&native_url).await?;
        driver.ping().await?;
        tracing::debug!(provider, driver = name, "database connection established");
        Ok(Self {
            driver,
            provider: provider.to_string(),
        })
    }

    /// Open a connection from a structured [`Config`]
    pub async fn connect(provider: &str, cfg: &Config) -> Result<Self, DbError> {
        let name = driver_name(provider);
        let mut driver = registry::get(name)?;
        driver.connect(cfg).await?;
        Ok(Self {
            driver,
            provider: provider.to_string(),
        })
    }

    /// The schema-level provider name this client was opened for
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The name of the underlying driver
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        self.driver.ping().await
    }

    pub async fn query_history(&self, sql: &str) -> Result<Vec<HistoryRow>, DbError> {
        self.driver.query_history(sql).await
    }

    pub async fn execute(&self, sql: &str) -> Result<u64, DbError> {
        self.driver.execute(sql).await
    }

    pub async fn close(&self) {
        self.driver.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register_builtin_drivers;

    #[tokio::test]
    async fn unregistered_provider_is_reported() {
        register_builtin_drivers().unwrap();
        let err = Client::from_schema_url("mongodb", "mongodb://localhost/db")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DriverNotRegistered { .. }));
    }

    #[tokio::test]
    async fn unreachable_sqlite_file_is_an_open_error() {
        register_builtin_drivers().unwrap();
        let err = Client::from_schema_url("sqlite", "file:/nowhere/at/all.db")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Open(_)));
    }
}

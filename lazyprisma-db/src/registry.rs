//! Driver registry
//!
//! Maps driver names to factories producing fresh driver instances. A global
//! registry backs normal operation; tests create their own [`Registry`]
//! instances for isolation.

use crate::driver::DbDriver;
use crate::drivers;
use crate::error::DbError;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::RwLock;

/// Produces a new, unconnected driver instance
pub type DriverFactory = fn() -> Box<dyn DbDriver>;

/// A name → factory map with checked registration
pub struct Registry {
    drivers: RwLock<HashMap<String, DriverFactory>>,
}

lazy_static! {
    static ref GLOBAL: Registry = Registry::new();
}

impl Registry {
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a factory under a name. Re-registering a name is an error.
    pub fn register(&self, name: &str, factory: DriverFactory) -> Result<(), DbError> {
        let mut drivers = self.drivers.write().unwrap();
        if drivers.contains_key(name) {
            return Err(DbError::AlreadyRegistered(name.to_string()));
        }
        drivers.insert(name.to_string(), factory);
        Ok(())
    }

    /// Create a new driver instance by name
    pub fn get(&self, name: &str) -> Result<Box<dyn DbDriver>, DbError> {
        let drivers = self.drivers.read().unwrap();
        match drivers.get(name) {
            Some(factory) => Ok(factory()),
            None => {
                let mut registered: Vec<String> = drivers.keys().cloned().collect();
                registered.sort();
                Err(DbError::DriverNotRegistered {
                    name: name.to_string(),
                    registered,
                })
            }
        }
    }

    /// All registered driver names, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drivers.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has(&self, name: &str) -> bool {
        self.drivers.read().unwrap().contains_key(name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register a driver factory in the global registry
pub fn register(name: &str, factory: DriverFactory) -> Result<(), DbError> {
    GLOBAL.register(name, factory)
}

/// Create a new driver instance from the global registry
pub fn get(name: &str) -> Result<Box<dyn DbDriver>, DbError> {
    GLOBAL.get(name)
}

/// All driver names in the global registry, sorted
pub fn list() -> Vec<String> {
    GLOBAL.list()
}

/// Whether the global registry knows this driver name
pub fn has(name: &str) -> bool {
    GLOBAL.has(name)
}

/// Register the built-in drivers (postgres, mysql, sqlite) in the global
/// registry. Explicit startup step; safe to call more than once.
pub fn register_builtin_drivers() -> Result<(), DbError> {
    for (name, factory) in [
        ("postgres", drivers::postgres::new_driver as DriverFactory),
        ("mysql", drivers::mysql::new_driver as DriverFactory),
        ("sqlite", drivers::sqlite::new_driver as DriverFactory),
    ] {
        if !GLOBAL.has(name) {
            GLOBAL.register(name, factory)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_get() {
        let registry = Registry::new();
        registry
            .register("sqlite", drivers::sqlite::new_driver)
            .unwrap();
        let driver = registry.get("sqlite").unwrap();
        assert_eq!(driver.name(), "sqlite");
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let registry = Registry::new();
        registry
            .register("sqlite", drivers::sqlite::new_driver)
            .unwrap();
        let err = registry
            .register("sqlite", drivers::sqlite::new_driver)
            .unwrap_err();
        assert!(matches!(err, DbError::AlreadyRegistered(name) if name == "sqlite"));
    }

    #[test]
    fn get_unknown_reports_registered_set() {
        let registry = Registry::new();
        registry
            .register("postgres", drivers::postgres::new_driver)
            .unwrap();
        registry
            .register("mysql", drivers::mysql::new_driver)
            .unwrap();

        let err = registry.get("oracle").unwrap_err();
        match err {
            DbError::DriverNotRegistered { name, registered } => {
                assert_eq!(name, "oracle");
                assert_eq!(registered, vec!["mysql", "postgres"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn list_is_sorted() {
        let registry = Registry::new();
        registry
            .register("sqlite", drivers::sqlite::new_driver)
            .unwrap();
        registry
            .register("mysql", drivers::mysql::new_driver)
            .unwrap();
        assert_eq!(registry.list(), vec!["mysql", "sqlite"]);
    }

    #[test]
    fn has_reflects_registration() {
        let registry = Registry::new();
        assert!(!registry.has("postgres"));
        registry
            .register("postgres", drivers::postgres::new_driver)
            .unwrap();
        assert!(registry.has("postgres"));
    }

    #[test]
    fn builtin_registration_is_repeatable() {
        register_builtin_drivers().unwrap();
        register_builtin_drivers().unwrap();
        assert!(has("postgres"));
        assert!(has("mysql"));
        assert!(has("sqlite"));
    }
}

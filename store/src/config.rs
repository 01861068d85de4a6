//! Configuration management for the cart store.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Namespace used when `CART_NAMESPACE` is not set.
pub const DEFAULT_NAMESPACE: &str = "@cart";

/// Suffix of the storage key holding the cart snapshot.
pub const PRODUCTS_KEY: &str = "Products";

/// How fire-and-forget persistence writes are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistMode {
    /// One background task per write. Writes may land out of order.
    #[default]
    Detached,
    /// A single writer task applies writes in submission order.
    Sequenced,
}

impl FromStr for PersistMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detached" => Ok(Self::Detached),
            "sequenced" => Ok(Self::Sequenced),
            other => Err(ConfigError::InvalidPersistMode(other.to_string())),
        }
    }
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartConfig {
    /// Prefix of the storage key, e.g. `@shop` gives `@shop:Products`
    pub namespace: String,
    /// Directory for file-backed storage; in-memory storage when unset
    pub storage_dir: Option<PathBuf>,
    /// Scheduling of persistence writes
    pub persist_mode: PersistMode,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            storage_dir: None,
            persist_mode: PersistMode::default(),
        }
    }
}

impl CartConfig {
    /// Load `.env` if present, then read configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = lookup("CART_NAMESPACE").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        if namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }

        let storage_dir = lookup("CART_STORAGE_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        let persist_mode = match lookup("CART_PERSIST_MODE") {
            Some(mode) => mode.parse()?,
            None => PersistMode::default(),
        };

        Ok(Self {
            namespace,
            storage_dir,
            persist_mode,
        })
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    pub fn with_persist_mode(mut self, mode: PersistMode) -> Self {
        self.persist_mode = mode;
        self
    }

    /// Storage key of the cart snapshot: `<namespace>:Products`.
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.namespace, PRODUCTS_KEY)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CART_NAMESPACE must not be empty")]
    EmptyNamespace,

    #[error("Invalid CART_PERSIST_MODE value: {0}")]
    InvalidPersistMode(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = CartConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, CartConfig::default());
        assert_eq!(config.storage_key(), "@cart:Products");
    }

    #[test]
    fn reads_all_variables() {
        let config = CartConfig::from_vars(vars(&[
            ("CART_NAMESPACE", "@shop"),
            ("CART_STORAGE_DIR", "/tmp/cart"),
            ("CART_PERSIST_MODE", "Sequenced"),
        ]))
        .unwrap();

        assert_eq!(config.storage_key(), "@shop:Products");
        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/cart")));
        assert_eq!(config.persist_mode, PersistMode::Sequenced);
    }

    #[test]
    fn rejects_bad_values() {
        let result = CartConfig::from_vars(vars(&[("CART_NAMESPACE", "  ")]));
        assert!(matches!(result, Err(ConfigError::EmptyNamespace)));

        let result = CartConfig::from_vars(vars(&[("CART_PERSIST_MODE", "eventually")]));
        assert!(matches!(result, Err(ConfigError::InvalidPersistMode(m)) if m == "eventually"));
    }

    #[test]
    fn builder_setters() {
        let config = CartConfig::default()
            .with_namespace("@test")
            .with_persist_mode(PersistMode::Sequenced)
            .with_storage_dir("data");

        assert_eq!(config.namespace, "@test");
        assert_eq!(config.persist_mode, PersistMode::Sequenced);
        assert_eq!(config.storage_dir, Some(PathBuf::from("data")));
    }

    #[test]
    fn deserializes_partial_json() {
        let config: CartConfig = serde_json::from_str(r#"{"persistMode": "sequenced"}"#).unwrap();
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.persist_mode, PersistMode::Sequenced);
    }
}

//! JSON configuration for a connector, with environment overrides

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    chain::{ChainDescriptor, ChainTable, NITRO_DEVNODE_ID},
    connector::ConnectorOptions,
    keystore::FileKeyStore,
};

/// Where the burner key lives when nothing else is configured.
pub const DEFAULT_KEY_STORE: &str = ".burner/burner.key";

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectorConfig {
    pub default_chain_id: Option<u64>,
    pub private_key: Option<String>,
    pub key_store: Option<PathBuf>,
    pub chains: Option<Vec<ChainDescriptor>>,
}

impl ConnectorConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("parsing connector config")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading connector config {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// Overlay `PRIVATE_KEY`, `CHAIN_ID` and `KEY_STORE` as returned by `lookup`.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        if let Some(key) = lookup("PRIVATE_KEY").filter(|k| !k.is_empty()) {
            self.private_key = Some(key);
        }
        if let Some(id) = lookup("CHAIN_ID") {
            let id = id
                .trim()
                .parse::<u64>()
                .with_context(|| format!("CHAIN_ID is not a chain id: {id}"))?;
            self.default_chain_id = Some(id);
        }
        if let Some(path) = lookup("KEY_STORE") {
            self.key_store = Some(path.into());
        }
        Ok(self)
    }

    /// Overlay the process environment.
    pub fn with_process_env(self) -> anyhow::Result<Self> {
        self.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Explicit chains if configured, the built-in table otherwise
    pub fn chain_table(&self) -> ChainTable {
        match &self.chains {
            Some(chains) => ChainTable::new(chains.clone()),
            None => ChainTable::builtin(),
        }
    }

    pub fn key_store(&self) -> FileKeyStore {
        FileKeyStore::new(
            self.key_store
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_STORE)),
        )
    }

    pub fn into_options(self) -> ConnectorOptions {
        ConnectorOptions {
            default_chain_id: self.default_chain_id.or(Some(NITRO_DEVNODE_ID)),
            private_key: self.private_key,
        }
    }
}

impl std::fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("default_chain_id", &self.default_chain_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("key_store", &self.key_store)
            .field("chains", &self.chains)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_config() {
        let config = ConnectorConfig::from_json_str(
            r#"{
                "defaultChainId": 421614,
                "keyStore": "/tmp/burner.key",
                "chains": [
                    { "id": 421614, "name": "Arbitrum Sepolia", "rpcUrls": ["https://sepolia-rollup.arbitrum.io/rpc"] }
                ]
            }"#,
        )
        .unwrap();

        let table = config.chain_table();
        assert!(table.contains(421614));
        assert!(!table.contains(NITRO_DEVNODE_ID));
        assert_eq!(config.key_store().path(), Path::new("/tmp/burner.key"));

        let options = config.into_options();
        assert_eq!(options.default_chain_id, Some(421614));
        assert!(options.private_key.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ConnectorConfig::from_json_str("{}").unwrap();
        assert_eq!(config.chain_table(), ChainTable::builtin());
        assert_eq!(config.key_store().path(), Path::new(DEFAULT_KEY_STORE));
        assert_eq!(config.into_options().default_chain_id, Some(NITRO_DEVNODE_ID));
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            ("PRIVATE_KEY", "0x01"),
            ("CHAIN_ID", " 42161 "),
            ("KEY_STORE", "keys/dev.key"),
        ]);
        let config = ConnectorConfig::default()
            .with_env_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.default_chain_id, Some(42161));
        assert_eq!(config.private_key.as_deref(), Some("0x01"));
        assert_eq!(config.key_store().path(), Path::new("keys/dev.key"));
        assert!(!format!("{config:?}").contains("0x01"));

        let bad = ConnectorConfig::default()
            .with_env_overrides(|name| (name == "CHAIN_ID").then(|| "devnet".to_string()));
        assert!(bad.is_err());
    }

    #[test]
    fn test_process_env_overlay() {
        let chain_id = std::env::var("CHAIN_ID").ok();
        match ConnectorConfig::default().with_process_env() {
            Ok(config) => {
                let expected = chain_id.and_then(|id| id.trim().parse::<u64>().ok());
                assert_eq!(config.default_chain_id, expected);
                assert_eq!(
                    config.key_store.is_some(),
                    std::env::var_os("KEY_STORE").is_some()
                );
            }
            // only an unparsable CHAIN_ID is rejected
            Err(_) => assert!(chain_id.unwrap().trim().parse::<u64>().is_err()),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConnectorConfig::from_file(dir.path().join("missing.json")).is_err());
    }
}

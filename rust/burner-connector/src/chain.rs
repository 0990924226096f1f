//! Static table of the networks the connector can bind to

use alloy::transports::http::reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, ConnectorResult};

/// Chain id of the local Arbitrum Nitro devnode.
pub const NITRO_DEVNODE_ID: u64 = 412346;
pub const ARBITRUM_SEPOLIA_ID: u64 = 421614;
pub const ARBITRUM_ONE_ID: u64 = 42161;

/// Static parameters of a supported network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub id: u64,
    pub name: String,
    pub rpc_urls: Vec<String>,
}

impl ChainDescriptor {
    pub fn new(id: u64, name: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rpc_urls: vec![rpc_url.into()],
        }
    }

    /// The endpoint transports are bound to: the first entry of `rpc_urls`.
    pub fn primary_rpc(&self) -> ConnectorResult<Url> {
        let raw = self
            .rpc_urls
            .first()
            .ok_or_else(|| ConnectorError::InvalidRpcEndpoint {
                chain_id: self.id,
                reason: "no rpc endpoint configured".to_string(),
            })?;
        raw.parse().map_err(|err| ConnectorError::InvalidRpcEndpoint {
            chain_id: self.id,
            reason: format!("{raw}: {err}"),
        })
    }
}

/// Read-only lookup from chain id to [`ChainDescriptor`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainTable {
    chains: Vec<ChainDescriptor>,
}

impl ChainTable {
    pub fn new(chains: Vec<ChainDescriptor>) -> Self {
        Self { chains }
    }

    /// The networks a freshly scaffolded project targets.
    pub fn builtin() -> Self {
        Self::new(vec![
            ChainDescriptor::new(NITRO_DEVNODE_ID, "Arbitrum Nitro Devnode", "http://localhost:8547"),
            ChainDescriptor::new(
                ARBITRUM_SEPOLIA_ID,
                "Arbitrum Sepolia",
                "https://sepolia-rollup.arbitrum.io/rpc",
            ),
            ChainDescriptor::new(ARBITRUM_ONE_ID, "Arbitrum One", "https://arb1.arbitrum.io/rpc"),
        ])
    }

    /// Parse a JSON array of chain descriptors
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn get(&self, id: u64) -> ConnectorResult<&ChainDescriptor> {
        self.chains
            .iter()
            .find(|chain| chain.id == id)
            .ok_or(ConnectorError::ChainNotSupported(id))
    }

    pub fn contains(&self, id: u64) -> bool {
        self.chains.iter().any(|chain| chain.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn test_lookup_returns_matching_descriptor() {
        let table = ChainTable::builtin();
        for chain in table.iter() {
            assert_eq!(table.get(chain.id).unwrap().id, chain.id);
        }
        assert!(table.contains(NITRO_DEVNODE_ID));
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let table = ChainTable::builtin();
        let rng = &mut rand::rng();
        for _ in 0..64 {
            let id = rng.random::<u64>();
            if table.contains(id) {
                continue;
            }
            assert_eq!(table.get(id), Err(ConnectorError::ChainNotSupported(id)));
        }
    }

    #[test]
    fn test_table_from_json() {
        let table = ChainTable::from_json(
            r#"[{ "id": 412346, "name": "devnet", "rpcUrls": ["http://localhost:8547"] }]"#,
        )
        .unwrap();
        let devnet = table.get(412346).unwrap();
        assert_eq!(devnet.name, "devnet");
        assert_eq!(
            devnet.primary_rpc().unwrap().as_str(),
            "http://localhost:8547/"
        );
        assert!(!table.contains(ARBITRUM_ONE_ID));
    }

    #[test]
    fn test_malformed_endpoint() {
        let chain = ChainDescriptor::new(7, "broken", "not a url");
        assert!(matches!(
            chain.primary_rpc(),
            Err(ConnectorError::InvalidRpcEndpoint { chain_id: 7, .. })
        ));

        let empty = ChainDescriptor {
            id: 8,
            name: "empty".into(),
            rpc_urls: vec![],
        };
        assert!(empty.primary_rpc().is_err());
    }
}

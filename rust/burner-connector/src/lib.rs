//! Burner wallet connector and deployment helpers for Stylus projects.
//!
//! This crate provides the in-browser style burner connector as a Rust capability object:
//! chain resolution against a static table, key loading with a persisted fallback, a lazily
//! built chain-bound client, and lifecycle notifications. It also keeps the deployment
//! address book and can deploy raw init code through a connected client.

pub mod chain;
pub mod config;
pub mod connector;
pub mod deployer;
pub mod deployments;
pub mod error;
pub mod identity;
pub mod keystore;
pub mod provider;

pub use chain::{ChainDescriptor, ChainTable};
pub use config::ConnectorConfig;
pub use connector::{
    BurnerConnector, ChainStatus, ChangeEvent, ConnectionSnapshot, ConnectorEvent,
    ConnectorOptions, WalletConnector,
};
pub use error::{ConnectorError, ConnectorResult};
pub use identity::SigningIdentity;
pub use keystore::{FileKeyStore, KeySource, MnemonicKey, StaticKey};
pub use provider::{ConnectedClient, Transport};

/// Build a connector for the burner key store and chains described by `config`.
pub fn connector_from_config(config: ConnectorConfig) -> BurnerConnector<FileKeyStore> {
    let chains = config.chain_table();
    let key_store = config.key_store();
    BurnerConnector::new(chains, config.into_options(), key_store)
}

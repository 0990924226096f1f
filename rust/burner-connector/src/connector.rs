//! The burner wallet connector.
//!
//! A [`BurnerConnector`] resolves the chain to talk to, derives the burner identity from
//! its key material, and lazily builds a chain-bound [`ConnectedClient`]. The hosting
//! wallet framework only sees the [`WalletConnector`] capability surface and the
//! [`ConnectorEvent`] notifications.
//!
//! Cached state lives in a single [`State`] record. Every operation computes the complete
//! replacement first and assigns it as its last step, so a failed operation leaves the
//! previous state untouched and no partially rebound state is ever observable.

use std::future::Future;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{
    chain::{ChainDescriptor, ChainTable},
    error::{ConnectorError, ConnectorResult},
    identity::SigningIdentity,
    keystore::KeySource,
    provider::{ConnectedClient, Transport, build_client, build_transport},
};

pub const BURNER_WALLET_ID: &str = "burner-wallet";
pub const BURNER_WALLET_NAME: &str = "Burner Wallet";

const EVENT_CAPACITY: usize = 16;

/// Options the connector is constructed with
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorOptions {
    /// Chain used whenever a caller does not name one.
    pub default_chain_id: Option<u64>,
    /// Explicit key; takes precedence over the connector's key source.
    pub private_key: Option<String>,
}

impl std::fmt::Debug for ConnectorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorOptions")
            .field("default_chain_id", &self.default_chain_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStatus {
    pub id: u64,
    pub unsupported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub chain: Option<ChainStatus>,
    pub account: Option<Address>,
}

/// Notifications emitted to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorEvent {
    Change(ChangeEvent),
    Disconnect,
}

/// Returned by a successful `connect`
#[derive(Debug, Clone)]
pub struct ConnectionSnapshot {
    pub account: Address,
    pub chain: ChainStatus,
    pub transport: Transport,
}

/// Capability surface a wallet-management framework drives.
pub trait WalletConnector {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn connect(
        &mut self,
        chain_id: Option<u64>,
    ) -> impl Future<Output = ConnectorResult<ConnectionSnapshot>> + Send;

    fn get_client(
        &mut self,
        chain_id: Option<u64>,
    ) -> impl Future<Output = ConnectorResult<ConnectedClient>> + Send;

    fn current_address(&mut self) -> impl Future<Output = ConnectorResult<Address>> + Send;

    fn current_chain_id(&self) -> ConnectorResult<u64>;

    /// Probe only: never surfaces the reason an address is unavailable.
    fn is_authorized(&mut self) -> impl Future<Output = bool> + Send;

    fn switch_chain(
        &mut self,
        chain_id: u64,
    ) -> impl Future<Output = ConnectorResult<ChainDescriptor>> + Send;

    fn disconnect(&self);
}

#[derive(Debug, Clone, Default)]
struct State {
    identity: Option<SigningIdentity>,
    client: Option<ConnectedClient>,
    transport: Option<Transport>,
}

pub struct BurnerConnector<K> {
    chains: ChainTable,
    options: ConnectorOptions,
    key_source: K,
    state: State,
    events: broadcast::Sender<ConnectorEvent>,
}

impl<K: KeySource> BurnerConnector<K> {
    pub fn new(chains: ChainTable, options: ConnectorOptions, key_source: K) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            chains,
            options,
            key_source,
            state: State::default(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.events.subscribe()
    }

    pub fn chains(&self) -> &ChainTable {
        &self.chains
    }

    pub fn options(&self) -> &ConnectorOptions {
        &self.options
    }

    /// Whether an identity is loaded and a client is cached. `connect` to another chain drops
    /// the cached client, so this stays false until `get_client` binds one there.
    pub fn is_connected(&self) -> bool {
        self.state.identity.is_some() && self.state.client.is_some()
    }

    /// Look up `chain_id`, or the configured default when omitted.
    pub fn resolve_chain(&self, chain_id: Option<u64>) -> ConnectorResult<&ChainDescriptor> {
        let id = chain_id
            .or(self.options.default_chain_id)
            .ok_or(ConnectorError::ChainIdUnresolved)?;
        self.chains.get(id)
    }

    /// Derive the identity from the explicit key if configured, else from the key source.
    pub async fn load_identity(&self) -> ConnectorResult<SigningIdentity> {
        match &self.options.private_key {
            Some(key) => SigningIdentity::from_hex(key),
            None => {
                let key = self
                    .key_source
                    .load_key()
                    .await
                    .map_err(|err| ConnectorError::IdentityUnavailable(format!("{err:#}")))?;
                SigningIdentity::from_hex(&key)
            }
        }
    }

    async fn cached_or_load_identity(&self) -> ConnectorResult<SigningIdentity> {
        match &self.state.identity {
            Some(identity) => Ok(identity.clone()),
            None => self.load_identity().await,
        }
    }

    /// Re-read the key material and rebind the client on the active chain.
    pub async fn refresh_account(&mut self) -> ConnectorResult<Address> {
        let identity = self.load_identity().await?;
        let chain = self.resolve_chain(Some(self.current_chain_id()?))?;
        let client = build_client(chain, &identity)?;
        let account = identity.address();

        self.state = State {
            identity: Some(identity),
            client: Some(client),
            transport: self.state.transport.clone(),
        };
        info!(%account, "burner account changed");
        self.emit(ConnectorEvent::Change(ChangeEvent {
            chain: None,
            account: Some(account),
        }));
        Ok(account)
    }

    fn emit(&self, event: ConnectorEvent) {
        // no receivers is not an error
        let _ = self.events.send(event);
    }
}

impl<K: KeySource> WalletConnector for BurnerConnector<K> {
    fn id(&self) -> &'static str {
        BURNER_WALLET_ID
    }

    fn name(&self) -> &'static str {
        BURNER_WALLET_NAME
    }

    async fn connect(&mut self, chain_id: Option<u64>) -> ConnectorResult<ConnectionSnapshot> {
        let chain = self.resolve_chain(chain_id)?;
        let transport =
            build_transport(chain).map_err(|err| ConnectorError::ConnectionFailed(err.to_string()))?;
        let chain = ChainStatus {
            id: chain.id,
            unsupported: false,
        };
        let identity = self
            .cached_or_load_identity()
            .await
            .map_err(|err| ConnectorError::ConnectionFailed(err.to_string()))?;
        let account = identity.address();

        self.state = State {
            identity: Some(identity),
            client: self
                .state
                .client
                .clone()
                .filter(|client| client.chain_id() == chain.id),
            transport: Some(transport.clone()),
        };
        info!(chain_id = chain.id, %account, "burner wallet connected");
        Ok(ConnectionSnapshot {
            account,
            chain,
            transport,
        })
    }

    async fn get_client(&mut self, chain_id: Option<u64>) -> ConnectorResult<ConnectedClient> {
        let target = chain_id
            .or(self.state.transport.as_ref().map(Transport::chain_id))
            .or(self.options.default_chain_id)
            .ok_or(ConnectorError::ChainIdUnresolved)?;
        if let Some(client) = self.state.client.as_ref().filter(|c| c.chain_id() == target) {
            debug!(chain_id = target, "reusing cached client");
            return Ok(client.clone());
        }

        let chain = self.resolve_chain(Some(target))?;
        let identity = self.cached_or_load_identity().await?;
        let client = build_client(chain, &identity)?;

        self.state = State {
            identity: Some(identity),
            client: Some(client.clone()),
            transport: self.state.transport.clone(),
        };
        Ok(client)
    }

    async fn current_address(&mut self) -> ConnectorResult<Address> {
        if let Some(identity) = &self.state.identity {
            return Ok(identity.address());
        }
        let identity = self.load_identity().await?;
        let address = identity.address();
        self.state.identity = Some(identity);
        Ok(address)
    }

    fn current_chain_id(&self) -> ConnectorResult<u64> {
        self.state
            .transport
            .as_ref()
            .map(Transport::chain_id)
            .or(self.options.default_chain_id)
            .ok_or(ConnectorError::ChainIdUnresolved)
    }

    async fn is_authorized(&mut self) -> bool {
        self.current_address().await.is_ok()
    }

    async fn switch_chain(&mut self, chain_id: u64) -> ConnectorResult<ChainDescriptor> {
        let chain = self.resolve_chain(Some(chain_id))?.clone();
        let transport = build_transport(&chain)?;
        let identity = self.cached_or_load_identity().await?;
        let client = build_client(&chain, &identity)?;

        self.state = State {
            identity: Some(identity),
            client: Some(client),
            transport: Some(transport),
        };
        info!(chain_id, name = %chain.name, "switched chain");
        self.emit(ConnectorEvent::Change(ChangeEvent {
            chain: Some(ChainStatus {
                id: chain_id,
                unsupported: false,
            }),
            account: None,
        }));
        Ok(chain)
    }

    fn disconnect(&self) {
        info!("disconnect from burner wallet");
        self.emit(ConnectorEvent::Disconnect);
    }
}

impl<K> std::fmt::Debug for BurnerConnector<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BurnerConnector")
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

//! Helper functions to build Ethereum [providers](https://docs.rs/alloy/latest/alloy/providers/trait.Provider.html)
//! bound to one chain, and to one signing identity for the wallet-carrying client.

use std::ops::Deref;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::Address,
    providers::{
        ProviderBuilder, RootProvider,
        fillers::{FillProvider, JoinFill, WalletFiller},
        utils::JoinedRecommendedFillers,
    },
};
use tracing::debug;

use crate::{chain::ChainDescriptor, error::ConnectorResult, identity::SigningIdentity};

pub type HttpProviderWithWallet = FillProvider<
    JoinFill<JoinedRecommendedFillers, WalletFiller<EthereumWallet>>,
    RootProvider,
    Ethereum,
>;

/// Provider connected to blockchain URL with read only access
pub type HttpProvider = FillProvider<JoinedRecommendedFillers, RootProvider, Ethereum>;

/// Read-only transport bound to the primary endpoint of `chain`
#[derive(Clone)]
pub struct Transport {
    chain_id: u64,
    inner: HttpProvider,
}

impl Transport {
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn provider(&self) -> &HttpProvider {
        &self.inner
    }
}

impl Deref for Transport {
    type Target = HttpProvider;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

/// Build a read-only transport; fails on a malformed endpoint, never touches the network.
pub fn build_transport(chain: &ChainDescriptor) -> ConnectorResult<Transport> {
    let url = chain.primary_rpc()?;
    debug!(chain_id = chain.id, %url, "building transport");
    Ok(Transport {
        chain_id: chain.id,
        inner: ProviderBuilder::new().connect_http(url),
    })
}

/// A provider with wallet, bound to exactly one chain and one identity, ready to send tx
#[derive(Clone)]
pub struct ConnectedClient {
    chain_id: u64,
    address: Address,
    inner: HttpProviderWithWallet,
}

impl ConnectedClient {
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Address of the bound signing identity
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn provider(&self) -> &HttpProviderWithWallet {
        &self.inner
    }
}

impl Deref for ConnectedClient {
    type Target = HttpProviderWithWallet;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl std::fmt::Debug for ConnectedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectedClient")
            .field("chain_id", &self.chain_id)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// a handy thin wrapper around wallet builder and provider builder that directly
/// returns a client with default fillers with wallet
pub fn build_client(
    chain: &ChainDescriptor,
    identity: &SigningIdentity,
) -> ConnectorResult<ConnectedClient> {
    let url = chain.primary_rpc()?;
    debug!(chain_id = chain.id, address = %identity.address(), "building wallet client");
    Ok(ConnectedClient {
        chain_id: chain.id,
        address: identity.address(),
        inner: ProviderBuilder::new()
            .wallet(identity.wallet())
            .connect_http(url),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use alloy::providers::WalletProvider;

    const DEV_KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_client_is_bound_to_chain_and_identity() {
        let chain = ChainDescriptor::new(412346, "devnet", "http://localhost:8547");
        let identity = SigningIdentity::from_hex(DEV_KEY_0).unwrap();

        let client = build_client(&chain, &identity).unwrap();
        assert_eq!(client.chain_id(), 412346);
        assert_eq!(client.address(), identity.address());
        assert_eq!(client.default_signer_address(), identity.address());

        let transport = build_transport(&chain).unwrap();
        assert_eq!(transport.chain_id(), 412346);
    }

    #[test]
    fn test_malformed_endpoint_fails_construction() {
        let chain = ChainDescriptor::new(1, "broken", "::not-a-url::");
        let identity = SigningIdentity::from_hex(DEV_KEY_0).unwrap();
        assert!(matches!(
            build_transport(&chain),
            Err(ConnectorError::InvalidRpcEndpoint { chain_id: 1, .. })
        ));
        assert!(build_client(&chain, &identity).is_err());
    }
}

//! Contract deployment through a connected client
use alloy::{
    contract::RawCallBuilder,
    primitives::{Address, Bytes},
    providers::Provider,
};

use crate::{deployments::AddressBook, provider::ConnectedClient};

type ContractResult<T> = Result<T, alloy::contract::Error>;

/// Deploy a contract (with logging)
pub async fn deploy<P: Provider>(name: &str, tx: RawCallBuilder<P>) -> ContractResult<Address> {
    tracing::info!("deploying {name}");
    let pending_tx = tx.send().await?;
    let tx_hash = *pending_tx.tx_hash();
    tracing::info!(%tx_hash, "waiting for tx to be mined");

    let receipt = pending_tx.get_receipt().await?;
    tracing::info!(%receipt.gas_used, %tx_hash, "tx mined");
    let addr = receipt
        .contract_address
        .ok_or(alloy::contract::Error::ContractNotDeployed)?;

    tracing::info!("deployed {name} at {addr:#x}");
    Ok(addr)
}

/// Send raw init code from the client's burner identity
pub async fn deploy_contract(
    client: &ConnectedClient,
    name: &str,
    init_code: Bytes,
) -> ContractResult<Address> {
    let tx = RawCallBuilder::new_raw_deploy(client.provider(), init_code);
    deploy(name, tx).await
}

/// Deploy, then record the address under the client's chain id and persist the book
pub async fn deploy_and_record(
    client: &ConnectedClient,
    book: &mut AddressBook,
    name: &str,
    init_code: Bytes,
) -> anyhow::Result<Address> {
    let addr = deploy_contract(client, name, init_code).await?;
    book.record(name, addr, client.chain_id());
    book.save()?;
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::deploy_and_record;
    use crate::{
        chain::{ChainDescriptor, ChainTable},
        connector::{BurnerConnector, ConnectorOptions, WalletConnector},
        deployments::AddressBook,
        keystore::StaticKey,
    };
    use alloy::{
        hex,
        node_bindings::Anvil,
        primitives::{U256, bytes},
        providers::Provider,
        rpc::types::TransactionRequest,
    };

    #[tokio::test]
    #[ignore = "requires a local anvil binary"]
    async fn test_deploy_through_connector() {
        let anvil = Anvil::new().spawn();
        let chains = ChainTable::new(vec![ChainDescriptor::new(
            anvil.chain_id(),
            "anvil",
            anvil.endpoint(),
        )]);
        let options = ConnectorOptions {
            default_chain_id: Some(anvil.chain_id()),
            private_key: None,
        };
        let key = hex::encode_prefixed(anvil.keys()[0].to_bytes());
        let mut connector = BurnerConnector::new(chains, options, StaticKey::new(key));

        let snapshot = connector.connect(None).await.unwrap();
        assert_eq!(snapshot.account, anvil.addresses()[0]);
        let client = connector.get_client(None).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut book = AddressBook::load(dir.path()).unwrap();
        // init code of a runtime that always returns 42
        let init_code = bytes!("600a600c600039600a6000f3602a60005260206000f3");
        let addr = deploy_and_record(&client, &mut book, "answer", init_code)
            .await
            .unwrap();

        assert!(!client.get_code_at(addr).await.unwrap().is_empty());
        let answer = client
            .call(TransactionRequest::default().to(addr))
            .await
            .unwrap();
        assert_eq!(U256::from_be_slice(&answer), U256::from(42));

        let reloaded = AddressBook::load(dir.path()).unwrap();
        let record = reloaded.get("answer").unwrap();
        assert_eq!(record.address, addr);
        assert_eq!(record.chain_id, anvil.chain_id());
    }
}

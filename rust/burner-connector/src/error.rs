//! Errors surfaced by the connector

use thiserror::Error;

pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("chain {0} is not supported")]
    ChainNotSupported(u64),

    #[error("could not connect: {0}")]
    ConnectionFailed(String),

    #[error("signing identity unavailable: {0}")]
    IdentityUnavailable(String),

    #[error("chain id could not be resolved")]
    ChainIdUnresolved,

    #[error("invalid rpc endpoint for chain {chain_id}: {reason}")]
    InvalidRpcEndpoint { chain_id: u64, reason: String },
}

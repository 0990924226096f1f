//! Key-derived signing identity

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    signers::local::PrivateKeySigner,
};

use crate::error::{ConnectorError, ConnectorResult};

/// An address together with the private key that signs for it
#[derive(Clone)]
pub struct SigningIdentity {
    signer: PrivateKeySigner,
}

impl SigningIdentity {
    /// Derive an identity from a hex-encoded private key (with or without `0x`).
    pub fn from_hex(key: &str) -> ConnectorResult<Self> {
        let key = key.trim();
        let key = key
            .strip_prefix("0x")
            .or_else(|| key.strip_prefix("0X"))
            .unwrap_or(key);
        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|err| ConnectorError::IdentityUnavailable(format!("malformed private key: {err}")))?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl From<PrivateKeySigner> for SigningIdentity {
    fn from(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const DEV_KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_identity_from_hex() {
        let identity = SigningIdentity::from_hex(DEV_KEY_0).unwrap();
        assert_eq!(
            identity.address(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );

        // derivation is stable and the prefix is optional
        let again = SigningIdentity::from_hex(DEV_KEY_0.trim_start_matches("0x")).unwrap();
        assert_eq!(identity.address(), again.address());
    }

    #[test]
    fn test_malformed_key() {
        for key in ["not-a-key", "", "0x1234", "0xzz0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"] {
            assert!(matches!(
                SigningIdentity::from_hex(key),
                Err(ConnectorError::IdentityUnavailable(_))
            ));
        }
    }

    #[test]
    fn test_debug_hides_key() {
        let identity = SigningIdentity::from_hex(DEV_KEY_0).unwrap();
        assert!(!format!("{identity:?}").contains("ac0974"));
    }
}

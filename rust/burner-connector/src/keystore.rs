//! Sources of raw private-key material for the burner identity

use std::{future::Future, path::PathBuf};

use alloy::{
    hex,
    signers::local::{LocalSignerError, MnemonicBuilder, PrivateKeySigner, coins_bip39::English},
};
use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Supplies a hex-encoded private key.
pub trait KeySource: Send + Sync {
    fn load_key(&self) -> impl Future<Output = anyhow::Result<String>> + Send;
}

/// A key handed over verbatim
#[derive(Clone)]
pub struct StaticKey(String);

impl StaticKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl std::fmt::Debug for StaticKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticKey(..)")
    }
}

impl KeySource for StaticKey {
    async fn load_key(&self) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

/// Burner key persisted in a local file, generated on first use.
///
/// A missing or empty file is replaced by a fresh key, created exclusively and, on unix,
/// readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn generate(&self) -> anyhow::Result<String> {
        let signer = PrivateKeySigner::random();
        let key = hex::encode_prefixed(signer.to_bytes());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating key store directory {}", parent.display()))?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = match options.open(&self.path).await {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                // lost the race against another first-use caller, keep its key
                let key = tokio::fs::read_to_string(&self.path)
                    .await
                    .with_context(|| format!("reading burner key from {}", self.path.display()))?;
                return Ok(key.trim().to_string());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("creating burner key file {}", self.path.display()));
            }
        };
        file.write_all(key.as_bytes())
            .await
            .with_context(|| format!("persisting burner key to {}", self.path.display()))?;
        file.flush().await?;

        warn!(
            path = %self.path.display(),
            address = %signer.address(),
            "no burner key found, generated a new one; it is stored unencrypted and must never hold real funds"
        );
        Ok(key)
    }
}

impl KeySource for FileKeyStore {
    async fn load_key(&self) -> anyhow::Result<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(key) if key.trim().is_empty() => {
                warn!(path = %self.path.display(), "burner key file is empty, replacing it");
                tokio::fs::remove_file(&self.path)
                    .await
                    .with_context(|| format!("removing empty key file {}", self.path.display()))?;
                self.generate().await
            }
            Ok(key) => {
                debug!(path = %self.path.display(), "loaded burner key");
                Ok(key.trim().to_string())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => self.generate().await,
            Err(err) => Err(err)
                .with_context(|| format!("reading burner key from {}", self.path.display())),
        }
    }
}

/// Build a local signer from wallet mnemonic and account index
pub fn build_signer(
    mnemonic: String,
    account_index: u32,
) -> Result<PrivateKeySigner, LocalSignerError> {
    MnemonicBuilder::<English>::default()
        .phrase(mnemonic)
        .index(account_index)?
        .build()
}

/// Key derived from a BIP-39 mnemonic at a given account index
#[derive(Clone)]
pub struct MnemonicKey {
    mnemonic: String,
    account_index: u32,
}

impl MnemonicKey {
    pub fn new(mnemonic: impl Into<String>, account_index: u32) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            account_index,
        }
    }
}

impl std::fmt::Debug for MnemonicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MnemonicKey")
            .field("account_index", &self.account_index)
            .finish_non_exhaustive()
    }
}

impl KeySource for MnemonicKey {
    async fn load_key(&self) -> anyhow::Result<String> {
        let signer = build_signer(self.mnemonic.clone(), self.account_index)
            .context("deriving key from mnemonic")?;
        Ok(hex::encode_prefixed(signer.to_bytes()))
    }
}

//! `addresses.json` address book kept in the deployment directory

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

pub const ADDRESS_BOOK_FILE: &str = "addresses.json";

#[derive(Debug, Error)]
pub enum AddressBookError {
    #[error("address book io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode address book: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where a contract was deployed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    pub address: Address,
    #[serde(with = "chain_id_string")]
    pub chain_id: u64,
}

/// Contract name to deployment record, persisted as pretty-printed JSON.
///
/// Entries that do not decode as a [`DeployedContract`] (such as an empty address written
/// by a failed deployment) are kept verbatim and written back on save, but are never
/// returned by [`AddressBook::get`].
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    dir: PathBuf,
    entries: BTreeMap<String, DeployedContract>,
    unparsed: BTreeMap<String, Value>,
}

impl AddressBook {
    /// Load the book from `dir`; a missing or unparsable file yields an empty book.
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self, AddressBookError> {
        let dir = dir.into();
        let path = dir.join(ADDRESS_BOOK_FILE);
        let raw: BTreeMap<String, Value> = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "could not parse address book, starting empty");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(AddressBookError::Io { path, source }),
        };

        let mut book = Self {
            dir,
            ..Default::default()
        };
        for (name, value) in raw {
            match serde_json::from_value::<DeployedContract>(value.clone()) {
                Ok(contract) => {
                    book.entries.insert(name, contract);
                }
                Err(err) => {
                    warn!(path = %path.display(), contract = %name, %err, "skipping unreadable address book entry");
                    book.unparsed.insert(name, value);
                }
            }
        }
        Ok(book)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(ADDRESS_BOOK_FILE)
    }

    /// Insert or replace the record for `name`
    pub fn record(&mut self, name: impl Into<String>, address: Address, chain_id: u64) {
        let name = name.into();
        self.unparsed.remove(&name);
        self.entries.insert(name, DeployedContract { address, chain_id });
    }

    pub fn get(&self, name: &str) -> Option<&DeployedContract> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &DeployedContract)> {
        self.entries.iter().map(|(name, c)| (name.as_str(), c))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.unparsed.is_empty()
    }

    pub fn save(&self) -> Result<(), AddressBookError> {
        fs::create_dir_all(&self.dir).map_err(|source| AddressBookError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path();
        let mut out = self.unparsed.clone();
        for (name, contract) in &self.entries {
            out.insert(name.clone(), serde_json::to_value(contract)?);
        }
        let json = serde_json::to_string_pretty(&out)?;
        fs::write(&path, json).map_err(|source| AddressBookError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), contracts = self.entries.len(), "saved address book");
        Ok(())
    }

    /// Remove the whole deployment directory, if any.
    pub fn clear(dir: impl AsRef<Path>) -> Result<(), AddressBookError> {
        let dir = dir.as_ref();
        match fs::remove_dir_all(dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(AddressBookError::Io {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }
}

// chain ids are written as decimal strings
mod chain_id_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(id: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

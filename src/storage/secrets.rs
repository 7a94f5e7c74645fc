use keyring::Entry;

use super::{Credentials, StorageError};

const KEYRING_SERVICE: &str = "portalwatch";
const KEYRING_USER: &str = "credentials";

// Both fields live in a single keyring entry so the pair always updates
// atomically.
#[derive(Debug)]
pub enum SecretsBackend {
    Keyring,
    File,
}

fn entry() -> Result<Entry, StorageError> {
    Entry::new(KEYRING_SERVICE, KEYRING_USER).map_err(StorageError::from)
}

// A missing entry still means the keyring itself is usable; only platform
// failures trip the plaintext fallback.
pub fn probe() -> Result<(), StorageError> {
    match entry()?.get_password() {
        Ok(_) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(StorageError::from(e)),
    }
}

pub fn load() -> Result<Option<Credentials>, StorageError> {
    match entry()?.get_password() {
        Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(StorageError::from(e)),
    }
}

pub fn store(credentials: &Credentials) -> Result<(), StorageError> {
    let raw = serde_json::to_string(credentials)?;
    entry()?.set_password(&raw).map_err(StorageError::from)
}

use keyring::Error as KeyringError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Keyring error: {0}")]
    Keyring(String),
}

impl From<KeyringError> for StorageError {
    fn from(error: KeyringError) -> Self {
        StorageError::Keyring(error.to_string())
    }
}

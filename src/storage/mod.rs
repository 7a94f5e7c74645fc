mod error;
mod secrets;

pub use error::StorageError;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use secrets::SecretsBackend;
use serde::{Deserialize, Serialize};

const PREFS_FILE: &str = "prefs.json";
const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub roll_number: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PrefDocument {
    #[serde(default)]
    auto_login_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_login_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_login_result: Option<String>,
    // Only populated when the keyring is unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<Credentials>,
}

pub enum OpenedStore {
    Encrypted(PreferenceStore),
    Plaintext(PreferenceStore),
}

impl OpenedStore {
    pub fn into_inner(self) -> PreferenceStore {
        match self {
            OpenedStore::Encrypted(store) | OpenedStore::Plaintext(store) => store,
        }
    }
}

pub struct PreferenceStore {
    path: PathBuf,
    secrets: SecretsBackend,
    doc: Mutex<PrefDocument>,
}

impl PreferenceStore {
    pub fn open(dir: &Path) -> Result<OpenedStore, StorageError> {
        match secrets::probe() {
            Ok(()) => Ok(OpenedStore::Encrypted(Self::with_backend(
                dir,
                SecretsBackend::Keyring,
            )?)),
            Err(e) => {
                warn!("Platform keyring unavailable, falling back to plaintext storage: {}", e);
                Ok(OpenedStore::Plaintext(Self::with_backend(
                    dir,
                    SecretsBackend::File,
                )?))
            }
        }
    }

    // Skips the keyring entirely; credentials land in the preference file.
    pub fn open_plaintext(dir: &Path) -> Result<Self, StorageError> {
        Self::with_backend(dir, SecretsBackend::File)
    }

    fn with_backend(dir: &Path, secrets: SecretsBackend) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(PREFS_FILE);
        let doc = Self::load_document(&path);
        Ok(Self {
            path,
            secrets,
            doc: Mutex::new(doc),
        })
    }

    fn load_document(path: &Path) -> PrefDocument {
        match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Corrupt preference file {}, starting fresh: {}", path.display(), e);
                PrefDocument::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PrefDocument::default(),
            Err(e) => {
                warn!("Failed to read {}, starting fresh: {}", path.display(), e);
                PrefDocument::default()
            }
        }
    }

    pub fn save_credentials(&self, roll_number: Option<&str>, password: Option<&str>) {
        let credentials = Credentials {
            roll_number: roll_number.unwrap_or_default().to_string(),
            password: password.unwrap_or_default().to_string(),
        };
        match self.secrets {
            SecretsBackend::Keyring => {
                if let Err(e) = secrets::store(&credentials) {
                    error!("Failed to save credentials, keeping previous values: {}", e);
                }
            }
            SecretsBackend::File => self.update(|doc| doc.credentials = Some(credentials)),
        }
    }

    pub fn credentials(&self) -> Credentials {
        match self.secrets {
            SecretsBackend::Keyring => match secrets::load() {
                Ok(credentials) => credentials.unwrap_or_default(),
                Err(e) => {
                    warn!("Failed to read credentials: {}", e);
                    Credentials::default()
                }
            },
            SecretsBackend::File => self.lock().credentials.clone().unwrap_or_default(),
        }
    }

    pub fn roll_number(&self) -> String {
        self.credentials().roll_number
    }

    pub fn password(&self) -> String {
        self.credentials().password
    }

    pub fn has_credentials(&self) -> bool {
        let credentials = self.credentials();
        !credentials.roll_number.is_empty() && !credentials.password.is_empty()
    }

    pub fn set_auto_login_enabled(&self, enabled: bool) {
        self.update(|doc| doc.auto_login_enabled = enabled);
    }

    pub fn auto_login_enabled(&self) -> bool {
        self.lock().auto_login_enabled
    }

    pub fn set_last_login(&self, timestamp: DateTime<Local>, message: &str) {
        let formatted = timestamp.format(DATE_FORMAT).to_string();
        let message = message.to_string();
        self.update(|doc| {
            doc.last_login_time = Some(formatted);
            doc.last_login_result = Some(message);
        });
    }

    pub fn last_login_time(&self) -> Option<String> {
        self.lock().last_login_time.clone()
    }

    pub fn last_login_result(&self) -> Option<String> {
        self.lock().last_login_result.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PrefDocument> {
        self.doc.lock().unwrap_or_else(|e| e.into_inner())
    }

    // Commit-then-swap: the in-memory document only advances once the new
    // contents are durably on disk.
    fn update<F: FnOnce(&mut PrefDocument)>(&self, apply: F) {
        let mut guard = self.lock();
        let mut next = guard.clone();
        apply(&mut next);
        match self.commit(&next) {
            Ok(()) => *guard = next,
            Err(e) => error!("Failed to persist preferences, keeping previous values: {}", e),
        }
    }

    fn commit(&self, doc: &PrefDocument) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

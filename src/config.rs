use std::path::PathBuf;
use std::time::Duration;

use url::Url;

// The portal endpoint is fixed vendor behavior; the override exists for
// pointing the daemon at a lab portal, not for protocol negotiation.
pub const DEFAULT_LOGIN_URL: &str = "http://172.16.1.3:8090/httpclient.html";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
    #[error("No usable data directory")]
    NoDataDir,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub portal: PortalConfig,
    pub network: NetworkConfig,
    pub storage: StorageConfig,
}

#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub login_url: Url,
    pub timeout_secs: u64,
}

impl PortalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug)]
pub struct NetworkConfig {
    pub poll_interval_secs: u64,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

pub fn build_config() -> Result<AppConfig, ConfigError> {
    debug!("Building AppConfig...");

    let login_url = match std::env::var("PORTAL_LOGIN_URL") {
        Ok(raw) => Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidValue(format!("PORTAL_LOGIN_URL: {}", e)))?,
        Err(_) => Url::parse(DEFAULT_LOGIN_URL)
            .map_err(|e| ConfigError::InvalidValue(format!("PORTAL_LOGIN_URL: {}", e)))?,
    };

    let timeout_secs = env_u64("PORTAL_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
    if timeout_secs == 0 {
        return Err(ConfigError::InvalidValue(
            "PORTAL_TIMEOUT_SECS must be greater than zero".to_string(),
        ));
    }

    let poll_interval_secs = env_u64("PORTAL_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
    if poll_interval_secs == 0 {
        return Err(ConfigError::InvalidValue(
            "PORTAL_POLL_INTERVAL_SECS must be greater than zero".to_string(),
        ));
    }

    let data_dir = match std::env::var_os("PORTAL_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::data_dir().ok_or(ConfigError::NoDataDir)?.join("portalwatch"),
    };

    Ok(AppConfig {
        portal: PortalConfig {
            login_url,
            timeout_secs,
        },
        network: NetworkConfig { poll_interval_secs },
        storage: StorageConfig { data_dir },
    })
}

fn env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue(format!("{} must be a number", key))),
        Err(_) => Ok(default),
    }
}

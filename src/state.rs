use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::runtime::{JobScheduler, TokioScheduler};
use crate::service::http::ReqwestTransport;
use crate::service::portal::PortalClient;
use crate::storage::{OpenedStore, PreferenceStore};

// Constructed once in main and passed down; nothing here is a global.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<PreferenceStore>,
    pub portal: Arc<PortalClient>,
    pub scheduler: Arc<dyn JobScheduler>,
}

impl AppState {
    pub fn new(config: AppConfig, plain_store: bool) -> AppResult<Self> {
        let opened = if plain_store {
            OpenedStore::Plaintext(PreferenceStore::open_plaintext(&config.storage.data_dir)?)
        } else {
            PreferenceStore::open(&config.storage.data_dir)?
        };

        let store = match opened {
            OpenedStore::Encrypted(store) => {
                info!("Credential store backed by the platform keyring");
                Arc::new(store)
            }
            OpenedStore::Plaintext(store) => {
                warn!("Credential store running in plaintext mode");
                Arc::new(store)
            }
        };

        let transport = Arc::new(ReqwestTransport::new(config.portal.timeout())?);
        let portal = Arc::new(PortalClient::new(transport, config.portal.login_url.clone()));
        let scheduler: Arc<dyn JobScheduler> = Arc::new(TokioScheduler::new());

        Ok(Self {
            config,
            store,
            portal,
            scheduler,
        })
    }
}

mod poller;
mod wifi;

pub use poller::ChangePoller;
pub use wifi::IwInspector;

use std::sync::Arc;

use async_trait::async_trait;

use crate::runtime::{JobScheduler, LoginJob, LOGIN_JOB_TAG};
use crate::service::portal::PortalClient;
use crate::storage::PreferenceStore;

const CAMPUS_SSID_PREFIX: &str = "MMMUT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected { ssid: Option<String> },
}

#[async_trait]
pub trait WifiInspector: Send + Sync {
    async fn wifi_state(&self) -> WifiState;
}

// Decides and enqueues; never performs the HTTP exchange itself.
pub struct NetworkWatcher {
    store: Arc<PreferenceStore>,
    portal: Arc<PortalClient>,
    inspector: Arc<dyn WifiInspector>,
    scheduler: Arc<dyn JobScheduler>,
}

impl NetworkWatcher {
    pub fn new(
        store: Arc<PreferenceStore>,
        portal: Arc<PortalClient>,
        inspector: Arc<dyn WifiInspector>,
        scheduler: Arc<dyn JobScheduler>,
    ) -> Self {
        Self {
            store,
            portal,
            inspector,
            scheduler,
        }
    }

    pub async fn handle_event(&self) {
        // Settings checks come first so a disabled watcher never queries the
        // WiFi state at all.
        if !self.store.auto_login_enabled() {
            debug!("Auto-login is disabled");
            return;
        }
        if !self.store.has_credentials() {
            debug!("No credentials saved");
            return;
        }

        let ssid = match self.inspector.wifi_state().await {
            WifiState::Disconnected => {
                debug!("Not connected to WiFi");
                return;
            }
            WifiState::Connected { ssid: None } => {
                debug!("SSID is unresolved");
                return;
            }
            WifiState::Connected { ssid: Some(ssid) } => ssid,
        };

        let ssid = ssid.trim_matches('"');
        debug!("Current WiFi SSID: {}", ssid);

        if !ssid.starts_with(CAMPUS_SSID_PREFIX) {
            debug!("Not a campus network: {}", ssid);
            return;
        }

        info!("Connected to campus network, requesting login job");
        let job = LoginJob::new(Arc::clone(&self.store), Arc::clone(&self.portal));
        self.scheduler.enqueue_unique(LOGIN_JOB_TAG, job).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::http::{HttpTransport, PortalResponse, TransportError};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::tempdir;
    use url::Url;

    struct FakeInspector {
        state: Mutex<WifiState>,
        queries: AtomicUsize,
    }

    impl FakeInspector {
        fn new(state: WifiState) -> Self {
            Self {
                state: Mutex::new(state),
                queries: AtomicUsize::new(0),
            }
        }

        fn set_state(&self, state: WifiState) {
            *self.state.lock().unwrap() = state;
        }
    }

    #[async_trait]
    impl WifiInspector for FakeInspector {
        async fn wifi_state(&self) -> WifiState {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.state.lock().unwrap().clone()
        }
    }

    // Enforces tag uniqueness like the real scheduler, but never runs jobs
    // and never releases tags, so a test sees exactly the dedup window.
    struct RecordingScheduler {
        requests: Mutex<Vec<String>>,
        in_flight: Mutex<HashSet<String>>,
        executions: AtomicUsize,
    }

    impl RecordingScheduler {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                in_flight: Mutex::new(HashSet::new()),
                executions: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl JobScheduler for RecordingScheduler {
        async fn enqueue_unique(&self, tag: &str, _job: LoginJob) {
            self.requests.lock().unwrap().push(tag.to_string());
            if self.in_flight.lock().unwrap().insert(tag.to_string()) {
                self.executions.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    struct NullTransport;

    #[async_trait]
    impl HttpTransport for NullTransport {
        async fn get(&self, _url: &str) -> Result<PortalResponse, TransportError> {
            Err(TransportError::Other("not wired in tests".to_string()))
        }

        async fn post_form(
            &self,
            _url: &str,
            _fields: &[(&str, String)],
        ) -> Result<PortalResponse, TransportError> {
            Err(TransportError::Other("not wired in tests".to_string()))
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<PreferenceStore>,
        inspector: Arc<FakeInspector>,
        scheduler: Arc<RecordingScheduler>,
        watcher: NetworkWatcher,
    }

    fn fixture(state: WifiState) -> Fixture {
        let dir = tempdir().unwrap();
        let store = Arc::new(PreferenceStore::open_plaintext(dir.path()).unwrap());
        store.save_credentials(Some("2021021001"), Some("pw"));
        store.set_auto_login_enabled(true);

        let url = Url::parse("http://172.16.1.3:8090/httpclient.html").unwrap();
        let portal = Arc::new(PortalClient::new(Arc::new(NullTransport), url));
        let inspector = Arc::new(FakeInspector::new(state));
        let scheduler = Arc::new(RecordingScheduler::new());
        let watcher = NetworkWatcher::new(
            Arc::clone(&store),
            portal,
            Arc::clone(&inspector) as Arc<dyn WifiInspector>,
            Arc::clone(&scheduler) as Arc<dyn JobScheduler>,
        );

        Fixture {
            _dir: dir,
            store,
            inspector,
            scheduler,
            watcher,
        }
    }

    fn campus(ssid: &str) -> WifiState {
        WifiState::Connected {
            ssid: Some(ssid.to_string()),
        }
    }

    #[tokio::test]
    async fn quoted_campus_ssid_triggers_one_enqueue() {
        let f = fixture(campus("\"MMMUT-Campus\""));

        f.watcher.handle_event().await;

        let requests = f.scheduler.requests.lock().unwrap().clone();
        assert_eq!(requests, vec!["wifi_login".to_string()]);
    }

    #[tokio::test]
    async fn other_ssid_triggers_nothing() {
        let f = fixture(campus("OtherNet"));

        f.watcher.handle_event().await;

        assert!(f.scheduler.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn prefix_match_is_case_sensitive() {
        let f = fixture(campus("mmmut-campus"));

        f.watcher.handle_event().await;

        assert!(f.scheduler.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_watcher_never_queries_wifi() {
        let f = fixture(campus("MMMUT-Campus"));
        f.store.set_auto_login_enabled(false);

        f.watcher.handle_event().await;

        assert!(f.scheduler.requests.lock().unwrap().is_empty());
        assert_eq!(f.inspector.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_credentials_never_query_wifi() {
        let f = fixture(campus("MMMUT-Campus"));
        f.store.save_credentials(None, None);

        f.watcher.handle_event().await;

        assert!(f.scheduler.requests.lock().unwrap().is_empty());
        assert_eq!(f.inspector.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn disconnected_wifi_triggers_nothing() {
        let f = fixture(WifiState::Disconnected);

        f.watcher.handle_event().await;

        assert!(f.scheduler.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unresolved_ssid_triggers_nothing() {
        let f = fixture(WifiState::Connected { ssid: None });

        f.watcher.handle_event().await;

        assert!(f.scheduler.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rapid_events_collapse_to_one_execution() {
        let f = fixture(campus("MMMUT-Campus"));

        f.watcher.handle_event().await;
        f.watcher.handle_event().await;

        assert_eq!(f.scheduler.requests.lock().unwrap().len(), 2);
        assert_eq!(f.scheduler.executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_fires_only_on_transitions() {
        use std::time::Duration;

        let f = fixture(campus("MMMUT-Campus"));
        let watcher = Arc::new(f.watcher);
        let inspector = Arc::clone(&f.inspector);
        let scheduler = Arc::clone(&f.scheduler);

        let poller = ChangePoller::new(
            Arc::clone(&inspector) as Arc<dyn WifiInspector>,
            Duration::from_secs(5),
        );
        tokio::spawn(async move { poller.watch(watcher).await });

        // First tick observes the campus network: one request.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(scheduler.requests.lock().unwrap().len(), 1);

        // Steady state: further ticks do not re-fire.
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(scheduler.requests.lock().unwrap().len(), 1);

        // Dropping off and rejoining the network fires again.
        inspector.set_state(WifiState::Disconnected);
        tokio::time::sleep(Duration::from_secs(6)).await;
        inspector.set_state(campus("MMMUT-Campus"));
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(scheduler.requests.lock().unwrap().len(), 2);
    }
}

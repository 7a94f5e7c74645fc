use std::sync::Arc;
use std::time::Duration;

use super::{NetworkWatcher, WifiInspector, WifiState};

// Stands in for an OS connectivity broadcast: polls the association and
// notifies the watcher on transitions only, with no payload. The watcher
// re-queries live state itself.
pub struct ChangePoller {
    inspector: Arc<dyn WifiInspector>,
    interval: Duration,
}

impl ChangePoller {
    pub fn new(inspector: Arc<dyn WifiInspector>, interval: Duration) -> Self {
        Self {
            inspector,
            interval,
        }
    }

    pub async fn watch(&self, watcher: Arc<NetworkWatcher>) {
        let mut ticker = tokio::time::interval(self.interval);
        let mut last: Option<WifiState> = None;

        loop {
            ticker.tick().await;
            let state = self.inspector.wifi_state().await;
            if last.as_ref() != Some(&state) {
                debug!("Network state changed: {:?}", state);
                last = Some(state);
                watcher.handle_event().await;
            }
        }
    }
}

use async_trait::async_trait;
use tokio::process::Command;

use super::{WifiInspector, WifiState};

// Reads the current association from wireless-tools. A missing or failing
// iwgetid reports Disconnected rather than erroring; the watcher treats
// both the same way.
pub struct IwInspector;

#[async_trait]
impl WifiInspector for IwInspector {
    async fn wifi_state(&self) -> WifiState {
        let output = match Command::new("iwgetid").arg("--raw").output().await {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to run iwgetid: {}", e);
                return WifiState::Disconnected;
            }
        };

        if !output.status.success() {
            return WifiState::Disconnected;
        }

        let ssid = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if ssid.is_empty() {
            WifiState::Connected { ssid: None }
        } else {
            WifiState::Connected { ssid: Some(ssid) }
        }
    }
}

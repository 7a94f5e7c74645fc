use std::sync::Arc;

use chrono::Local;

use crate::service::portal::PortalClient;
use crate::storage::PreferenceStore;

pub const LOGIN_JOB_TAG: &str = "wifi_login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    Failure,
}

// One login attempt: read credentials, hit the portal, record the result.
// Idempotent per invocation; retries are the scheduler's caller's problem.
#[derive(Clone)]
pub struct LoginJob {
    store: Arc<PreferenceStore>,
    portal: Arc<PortalClient>,
}

impl LoginJob {
    pub fn new(store: Arc<PreferenceStore>, portal: Arc<PortalClient>) -> Self {
        Self { store, portal }
    }

    pub async fn run(&self) -> JobOutcome {
        debug!("WiFi login job started");

        let credentials = self.store.credentials();
        if credentials.roll_number.is_empty() || credentials.password.is_empty() {
            error!("No credentials available");
            self.store.set_last_login(Local::now(), "Failed: No credentials");
            return JobOutcome::Failure;
        }

        let outcome = self
            .portal
            .login(&credentials.roll_number, &credentials.password)
            .await;

        // The record carries the time the portal call returned, success or not.
        self.store.set_last_login(Local::now(), outcome.message());
        info!("Login result: {}", outcome.message());

        if outcome.is_success() {
            JobOutcome::Success
        } else {
            JobOutcome::Failure
        }
    }
}

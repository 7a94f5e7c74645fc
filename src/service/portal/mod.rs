mod model;

pub use model::LoginOutcome;

use std::sync::Arc;

use chrono::Utc;
use url::Url;

use super::http::{HttpTransport, TransportError};

const PORTAL_MODE: &str = "191";
const PORTAL_PRODUCT_TYPE: &str = "0";

const SUCCESS_MARKERS: [&str; 3] = ["success", "logged in", "authentication successful"];
const FAILURE_MARKERS: [&str; 3] = ["invalid", "incorrect", "failed"];

pub struct PortalClient {
    transport: Arc<dyn HttpTransport>,
    login_url: Url,
}

impl PortalClient {
    pub fn new(transport: Arc<dyn HttpTransport>, login_url: Url) -> Self {
        Self {
            transport,
            login_url,
        }
    }

    pub async fn login(&self, roll_number: &str, password: &str) -> LoginOutcome {
        if roll_number.is_empty() || password.is_empty() {
            warn!("Login attempted without credentials");
            return LoginOutcome::InvalidCredentials("Invalid credentials".to_string());
        }

        debug!("Attempting login for roll number {}", roll_number);

        match self.attempt(roll_number, password).await {
            Ok(outcome) => outcome,
            Err(TransportError::Request(e)) => {
                error!("Network error during login: {}", e);
                LoginOutcome::NetworkError(format!("Network error: {}", e))
            }
            Err(TransportError::Other(e)) => {
                error!("Unexpected error during login: {}", e);
                LoginOutcome::NetworkError(format!("Error: {}", e))
            }
        }
    }

    async fn attempt(
        &self,
        roll_number: &str,
        password: &str,
    ) -> Result<LoginOutcome, TransportError> {
        // The portal only accepts the POST after a prior GET has established
        // session state; the page content itself is not inspected.
        let page = self.transport.get(self.login_url.as_str()).await?;
        if !page.status.is_success() {
            error!("Failed to access login page, status {}", page.status);
            return Ok(LoginOutcome::NetworkError(format!(
                "Failed to access login portal (HTTP {})",
                page.status.as_u16()
            )));
        }
        debug!("Successfully accessed login page");

        let fields = [
            ("username", roll_number.to_string()),
            ("password", password.to_string()),
            ("mode", PORTAL_MODE.to_string()),
            ("a", Utc::now().timestamp_millis().to_string()),
            ("producttype", PORTAL_PRODUCT_TYPE.to_string()),
        ];

        let response = self
            .transport
            .post_form(self.login_url.as_str(), &fields)
            .await?;
        if !response.status.is_success() {
            error!("Login request failed with status {}", response.status);
            return Ok(LoginOutcome::NetworkError(format!(
                "Login failed (HTTP {})",
                response.status.as_u16()
            )));
        }

        debug!("Login request completed with status {}", response.status);
        Ok(classify(&response.body))
    }
}

fn classify(body: &str) -> LoginOutcome {
    let body = body.to_lowercase();
    if SUCCESS_MARKERS.iter().any(|marker| body.contains(marker)) {
        info!("Login successful");
        LoginOutcome::Success("Login successful".to_string())
    } else if FAILURE_MARKERS.iter().any(|marker| body.contains(marker)) {
        warn!("Login rejected by portal");
        LoginOutcome::InvalidCredentials("Invalid credentials".to_string())
    } else {
        info!("Login likely successful");
        LoginOutcome::Ambiguous("Login completed".to_string())
    }
}

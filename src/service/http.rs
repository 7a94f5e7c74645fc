use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Request(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        TransportError::Request(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct PortalResponse {
    pub status: StatusCode,
    pub body: String,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<PortalResponse, TransportError>;
    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, String)],
    ) -> Result<PortalResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        // The cookie jar carries whatever session cookie the portal sets on
        // the GET into the credential POST.
        let cookie_jar = Arc::new(reqwest::cookie::Jar::default());
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .cookie_provider(cookie_jar)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<PortalResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(PortalResponse { status, body })
    }

    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, String)],
    ) -> Result<PortalResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header(header::REFERER, url)
            .form(fields)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(PortalResponse { status, body })
    }
}

use async_trait::async_trait;
use objstore_http::{HttpClient, HttpError};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::instrument;

use crate::config::ConnectorConfig;
use crate::domain::ports::ObjectStoreTransport;

/// [`ObjectStoreTransport`] over HTTPS with bearer authentication.
///
/// `HttpClient` is `Clone + Send + Sync`, so no external locking is needed.
pub struct HttpTransport {
    client: HttpClient,
    base_url: String,
    api_token: SecretString,
}

impl HttpTransport {
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns an `HttpError` if the client cannot be built.
    pub fn new(config: &ConnectorConfig) -> Result<Self, HttpError> {
        let client = HttpClient::new(&config.http_client_config())?;
        Ok(Self::with_client(
            client,
            config.base_url().to_owned(),
            SecretString::from(config.api_token.expose_secret().to_owned()),
        ))
    }

    #[must_use]
    pub fn with_client(client: HttpClient, base_url: String, api_token: SecretString) -> Self {
        Self {
            client,
            base_url,
            api_token,
        }
    }
}

#[async_trait]
impl ObjectStoreTransport for HttpTransport {
    #[instrument(skip_all, fields(base_url = %self.base_url, path = %path))]
    async fn post(&self, path: &str, body: &Value) -> Result<Option<Value>, HttpError> {
        let url = format!("{}{path}", self.base_url);
        self.client
            .post(&url)
            .bearer_auth(self.api_token.expose_secret())
            .json(body)?
            .send()
            .await?
            .json_opt()
            .await
    }
}

use async_trait::async_trait;
use objstore_http::HttpError;
use serde_json::Value;

/// Outbound port to the object store service.
///
/// Every operation is a JSON POST to a path relative to the service URL
/// (the path may carry a query string).
#[async_trait]
pub trait ObjectStoreTransport: Send + Sync {
    /// POST `body` to `path`.
    ///
    /// Returns `None` when the service answers 2xx with an empty body.
    ///
    /// # Errors
    /// Transport failures, timeouts and non-2xx statuses.
    async fn post(&self, path: &str, body: &Value) -> Result<Option<Value>, HttpError>;
}

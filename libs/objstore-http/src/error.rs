use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

type BoxedError = Box<dyn StdError + Send + Sync>;

/// Failure of a single object store request.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    #[error("cannot build request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS or protocol failure below HTTP.
    #[error("transport error: {0}")]
    Transport(#[source] BoxedError),

    #[error("TLS setup failed: {0}")]
    Tls(#[source] BoxedError),

    #[error("response body exceeds {limit} bytes (got {actual})")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Non-2xx answer. `body_preview` holds at most
    /// [`ERROR_BODY_PREVIEW_LIMIT`](crate::ERROR_BODY_PREVIEW_LIMIT) bytes.
    #[error("HTTP {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
        content_type: Option<String>,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The request buffer worker is gone.
    #[error("HTTP client is shut down")]
    ServiceClosed,

    #[error("invalid URL '{url}': {reason}")]
    InvalidUri { url: String, reason: String },

    #[error("URL scheme '{scheme}' rejected")]
    InvalidScheme { scheme: String },
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! JSON-over-HTTPS client for the object store service.
//!
//! One pooled hyper client behind a tower timeout and a request buffer, so a
//! single [`HttpClient`] is shared by every connector operation. TLS uses
//! rustls with webpki roots; `http://` is refused unless
//! [`TransportSecurity::AllowInsecureHttp`] is configured. Non-2xx answers
//! surface as [`HttpError::HttpStatus`] and bodies are capped at
//! `max_body_size`. Requests are never retried.
//!
//! # Example
//!
//! ```ignore
//! use objstore_http::{HttpClient, HttpClientConfig};
//!
//! let client = HttpClient::new(&HttpClientConfig::default())?;
//!
//! let hits: Option<SearchResponse> = client
//!     .post("https://objects.example.com/objects/search/objects?pageSize=100")
//!     .bearer_auth(token)
//!     .json(&body)?
//!     .send()
//!     .await?
//!     .json_opt()
//!     .await?;
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod tls;

pub use client::HttpClient;
pub use config::{DEFAULT_MAX_BODY_SIZE, DEFAULT_USER_AGENT, HttpClientConfig, TransportSecurity};
pub use error::HttpError;
pub use request::RequestBuilder;
pub use response::{ERROR_BODY_PREVIEW_LIMIT, HttpResponse};

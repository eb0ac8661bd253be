use crate::config::{HttpClientConfig, TransportSecurity};
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use crate::tls;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};

type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

pub(crate) type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

const BUFFER_CAPACITY: usize = 256;

/// Pooled HTTPS client with a per-request timeout.
///
/// `Clone + Send + Sync`; clones share the pool and the request buffer.
#[derive(Clone)]
pub struct HttpClient {
    service: BufferedService,
    max_body_size: usize,
    transport: TransportSecurity,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_body_size", &self.max_body_size)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Must be called inside a Tokio runtime: the request buffer spawns its
    /// worker here.
    ///
    /// # Errors
    /// `HttpError::Tls` when the rustls connector cannot be set up.
    pub fn new(config: &HttpClientConfig) -> Result<Self, HttpError> {
        if config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!("plain http:// allowed; use only against mock servers");
        }

        let timeout = config.request_timeout;
        let mut pool = Client::builder(TokioExecutor::new());
        // idle timeout needs the pool timer
        pool.pool_timer(TokioTimer::new());
        if let Some(idle) = config.pool_idle_timeout {
            pool.pool_idle_timeout(idle);
        }
        let hyper_client = pool.build::<_, Full<Bytes>>(https_connector(config.transport)?);

        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .service(hyper_client)
            .map_response(erase_body)
            .map_err(move |e: tower::BoxError| timeout_or_transport(e, timeout))
            .boxed_clone();

        Ok(Self {
            service: Buffer::new(service, BUFFER_CAPACITY),
            max_body_size: config.max_body_size,
            transport: config.transport,
        })
    }

    /// JSON POST to an absolute URL.
    pub fn post(&self, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            url.to_owned(),
            self.transport,
        )
    }
}

fn erase_body(response: Response<hyper::body::Incoming>) -> Response<ResponseBody> {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, body.map_err(Into::into).boxed())
}

fn timeout_or_transport(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

/// Errors coming out of the buffer are either the inner `HttpError` or a
/// closed worker.
pub(crate) fn unbuffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(error = %err, "request buffer worker is gone");
            HttpError::ServiceClosed
        }
    }
}

fn https_connector(
    transport: TransportSecurity,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let builder = hyper_rustls::HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(tls::get_crypto_provider())
        .map_err(|e| HttpError::Tls(Box::new(e)))?;
    Ok(match transport {
        TransportSecurity::AllowInsecureHttp => {
            builder.https_or_http().enable_all_versions().build()
        }
        TransportSecurity::TlsOnly => builder.https_only().enable_all_versions().build(),
    })
}

use crate::client::{BufferedService, unbuffer_error};
use crate::config::{DEFAULT_USER_AGENT, TransportSecurity};
use crate::error::HttpError;
use crate::response::HttpResponse;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue, USER_AGENT};
use http::{Method, Request, Uri};
use http_body_util::Full;
use serde::Serialize;
use tower::{Service, ServiceExt};

/// A pending POST, created by [`HttpClient::post`](crate::HttpClient::post).
///
/// A bad bearer token is reported by the next [`json`](Self::json) or
/// [`send`](Self::send).
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    url: String,
    transport: TransportSecurity,
    authorization: Option<HeaderValue>,
    body: Option<Bytes>,
    error: Option<HttpError>,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        url: String,
        transport: TransportSecurity,
    ) -> Self {
        Self {
            service,
            max_body_size,
            url,
            transport,
            authorization: None,
            body: None,
            error: None,
        }
    }

    /// `Authorization: Bearer <token>`, marked sensitive.
    pub fn bearer_auth(mut self, token: &str) -> Self {
        match HeaderValue::try_from(format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.authorization = Some(value);
            }
            Err(e) => self.error = Some(HttpError::InvalidHeaderValue(e)),
        }
        self
    }

    /// # Errors
    /// The deferred header error, or `HttpError::Json`.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// Every HTTP status is `Ok` here; the status check happens when the body
    /// is read.
    ///
    /// # Errors
    /// Deferred header errors, URL or scheme rejection, transport failures
    /// and timeouts.
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        let uri = checked_uri(&self.url, self.transport)?;

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        if self.body.is_some() {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(auth) = self.authorization {
            builder = builder.header(AUTHORIZATION, auth);
        }
        let request = builder.body(Full::new(self.body.unwrap_or_default()))?;

        let inner = self
            .service
            .ready()
            .await
            .map_err(unbuffer_error)?
            .call(request)
            .await
            .map_err(unbuffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}

fn checked_uri(url: &str, transport: TransportSecurity) -> Result<Uri, HttpError> {
    let invalid = |reason: String| HttpError::InvalidUri {
        url: url.to_owned(),
        reason,
    };
    let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| invalid(e.to_string()))?;
    if uri.authority().is_none() {
        return Err(invalid("missing host".to_owned()));
    }
    match uri.scheme_str() {
        Some("https") => Ok(uri),
        Some("http") if transport == TransportSecurity::AllowInsecureHttp => Ok(uri),
        Some(scheme) => Err(HttpError::InvalidScheme {
            scheme: scheme.to_owned(),
        }),
        None => Err(invalid("missing scheme".to_owned())),
    }
}

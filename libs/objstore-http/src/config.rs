use std::time::Duration;

/// `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("objstore-http/", env!("CARGO_PKG_VERSION"));

/// Response bodies above this size fail with `BodyTooLarge` (10 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Whether plain `http://` URLs are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportSecurity {
    #[default]
    TlsOnly,
    /// Mock servers and local development only.
    AllowInsecureHttp,
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub request_timeout: Duration,
    pub max_body_size: usize,
    pub transport: TransportSecurity,
    /// Idle pooled connections are closed after this long; `None` keeps them.
    pub pool_idle_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            transport: TransportSecurity::TlsOnly,
            pool_idle_timeout: Some(Duration::from_secs(90)),
        }
    }
}

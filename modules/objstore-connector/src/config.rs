//! Connector configuration.
//!
//! Layering: YAML file (optional) → environment (`OBJSTORE_*`, nested keys
//! separated by `__`, e.g. `OBJSTORE_PATHS__SEARCH`). Prefixed variables that
//! do not name a setting are skipped.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use objstore_http::{HttpClientConfig, TransportSecurity};
use objstore_query::{KeyDerivation, KeyHash, key::DEFAULT_STRIP};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::ConnectorError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "OBJSTORE_";

/// Settings of one connector instance.
///
/// `api_token` is redacted in `Debug` output.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorConfig {
    /// Base URL of the object store service.
    pub service_url: Url,

    /// Bearer token sent with every request.
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_token: SecretString,

    /// Object type used when a model does not declare its own `objectTypeId`.
    pub object_type: String,

    /// Added as `policy` to the properties of every created or modified object.
    #[serde(default)]
    pub policy: Option<String>,

    /// Per-request timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Search page size when the filter has no `limit`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Allow `http://` service URLs (mock servers, local development).
    #[serde(default)]
    pub allow_insecure_http: bool,

    /// Log the effective settings at construction.
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub paths: ServicePaths,

    #[serde(default)]
    pub key: KeyConfig,
}

/// Endpoint paths relative to `service_url`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServicePaths {
    /// Single-object edits (create, replace, delete).
    pub object_locator: String,
    /// Bulk edits, one locator body per object.
    pub object_locators: String,
    pub load_by_locator: String,
    pub search: String,
}

impl Default for ServicePaths {
    fn default() -> Self {
        Self {
            object_locator: "/storage/edits/events/objectLocator".to_owned(),
            object_locators: "/storage/edits/events/objectLocators".to_owned(),
            load_by_locator: "/storage/load/objectsByLocator".to_owned(),
            search: "/objects/search/objects".to_owned(),
        }
    }
}

/// Primary-key derivation for created objects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyConfig {
    /// Substring removed from the unique value before hashing; empty disables.
    pub strip: Option<String>,
    pub hash: KeyHash,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            strip: Some(DEFAULT_STRIP.to_owned()),
            hash: KeyHash::Md5,
        }
    }
}

impl KeyConfig {
    pub fn derivation(&self) -> KeyDerivation {
        KeyDerivation::new(self.strip.clone(), self.hash)
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_page_size() -> u32 {
    100
}

const TOP_LEVEL_KEYS: &[&str] = &[
    "service_url",
    "api_token",
    "object_type",
    "policy",
    "timeout",
    "default_page_size",
    "allow_insecure_http",
    "debug",
    "paths",
    "key",
];

/// `OBJSTORE_*` variables that name a setting; other variables sharing the
/// prefix are ignored instead of failing `deny_unknown_fields`.
fn env_overrides() -> Env {
    Env::prefixed(ENV_PREFIX)
        .split("__")
        .filter(|key| is_config_key(key.as_str()))
}

fn is_config_key(key: &str) -> bool {
    let root = key.split('.').next().unwrap_or_default();
    TOP_LEVEL_KEYS
        .iter()
        .any(|known| root.eq_ignore_ascii_case(known))
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl ConnectorConfig {
    /// Load from an optional YAML file plus `OBJSTORE_*` environment variables,
    /// then validate.
    ///
    /// # Errors
    /// Returns `ConnectorError::Config` if extraction or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConnectorError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        Self::from_figment(&figment.merge(env_overrides()))
    }

    /// Extract and validate from an already layered figment.
    ///
    /// # Errors
    /// Returns `ConnectorError::Config` if extraction or validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConnectorError> {
        let config: Self = figment
            .extract()
            .map_err(|e| ConnectorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `ConnectorError::Config` describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConnectorError> {
        if self.object_type.trim().is_empty() {
            return Err(ConnectorError::Config(
                "object_type must not be empty".to_owned(),
            ));
        }
        let scheme = self.service_url.scheme();
        if scheme != "https" && scheme != "http" {
            return Err(ConnectorError::Config(format!(
                "service_url scheme '{scheme}' is not supported"
            )));
        }
        if scheme == "http" && !self.allow_insecure_http {
            return Err(ConnectorError::Config(
                "service_url uses http:// but allow_insecure_http is false".to_owned(),
            ));
        }
        if self.service_url.host_str().is_none() {
            return Err(ConnectorError::Config(
                "service_url must include a host".to_owned(),
            ));
        }
        if self.default_page_size == 0 {
            return Err(ConnectorError::Config(
                "default_page_size must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    /// Service URL without a trailing slash; endpoint paths are appended to it.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.service_url.as_str().trim_end_matches('/')
    }

    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            request_timeout: self.timeout,
            transport: if self.allow_insecure_http {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
            ..HttpClientConfig::default()
        }
    }
}

use std::sync::Arc;

/// Crypto provider for TLS connections.
///
/// Uses the globally installed default provider when there is one, otherwise
/// an aws-lc-rs provider that is not installed globally.
pub(crate) fn get_crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

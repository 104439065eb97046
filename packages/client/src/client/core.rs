//! Core HTTP client
//!
//! [`HttpClient`] holds immutable configuration only; every call dials its
//! own connection, so clones can be shared freely across tasks.

use std::sync::{Arc, OnceLock};

use rustls::ClientConfig;

use crate::config::{HttpConfig, TlsConfig};
use crate::connect::build_client_config;
use crate::error;

/// Single-shot HTTP/1.1 client
#[derive(Debug, Clone)]
pub struct HttpClient {
    pub(super) config: Arc<HttpConfig>,
    tls: Arc<OnceLock<Arc<ClientConfig>>>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Create HttpClient with default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(HttpConfig::default())
    }

    /// Create HttpClient with custom configuration
    ///
    /// # Errors
    ///
    /// Returns a builder error if the configuration does not validate.
    pub fn with_config(config: HttpConfig) -> crate::Result<Self> {
        config.validate().map_err(error::builder)?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: HttpConfig) -> Self {
        Self {
            config: Arc::new(config),
            tls: Arc::new(OnceLock::new()),
        }
    }

    /// Get current configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// rustls configuration for an exchange, per-request settings first.
    pub(super) fn tls_config(&self, request_tls: Option<&TlsConfig>) -> crate::Result<Arc<ClientConfig>> {
        if let Some(tls) = request_tls {
            return build_client_config(tls);
        }
        if let Some(config) = self.tls.get() {
            return Ok(config.clone());
        }
        let config = build_client_config(&self.config.tls)?;
        // a concurrent caller may have won the race; either value is equivalent
        Ok(self.tls.get_or_init(|| config).clone())
    }
}

/// Shared client behind [`request`](crate::request).
static GLOBAL_CLIENT: OnceLock<HttpClient> = OnceLock::new();

/// Get the global HTTP client instance, creating a default one on first use.
pub fn global_client() -> &'static HttpClient {
    GLOBAL_CLIENT.get_or_init(HttpClient::new)
}

/// Initialize the global HTTP client with custom configuration
///
/// # Errors
///
/// Returns a builder error if the configuration does not validate or the
/// global client was already created.
pub fn init_global_client(config: HttpConfig) -> crate::Result<()> {
    let client = HttpClient::with_config(config)?;
    GLOBAL_CLIENT
        .set(client)
        .map_err(|_| error::builder("global client already initialized"))
}

//! Client configuration
//!
//! [`HttpConfig`] holds the defaults every request starts from; per-request
//! options on [`RequestOptions`](crate::RequestOptions) override them.

use std::time::Duration;

use http::HeaderMap;

pub mod validation;

pub use validation::{ConfigValidator, ConfigurationError};

/// TLS connection configuration
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Trust the operating system's root certificates
    pub use_native_certs: bool,
    /// Trust the bundled Mozilla root certificates
    pub use_webpki_roots: bool,
    /// Additional PEM-encoded root certificates
    pub extra_root_certs_pem: Vec<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            use_native_certs: false,
            use_webpki_roots: true,
            extra_root_certs_pem: Vec::new(),
        }
    }
}

impl TlsConfig {
    /// Trust an additional PEM-encoded root certificate (or bundle).
    #[must_use]
    pub fn add_root_certificate_pem<S: Into<String>>(mut self, pem: S) -> Self {
        self.extra_root_certs_pem.push(pem.into());
        self
    }

    /// Toggle the operating system trust store.
    #[must_use]
    pub fn native_certs(mut self, enabled: bool) -> Self {
        self.use_native_certs = enabled;
        self
    }
}

/// HTTP-specific configuration for client behavior
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Deadline for receiving response headers; `None` waits forever
    pub timeout: Option<Duration>,

    /// Deadline for establishing the TCP (and TLS) connection
    pub connect_timeout: Duration,

    /// Sent when the request carries no `User-Agent` header
    pub user_agent: String,

    /// Headers added to every request unless the request sets them
    pub default_headers: HeaderMap,

    pub tls: TlsConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("wxhttp/", env!("CARGO_PKG_VERSION")).to_string(),
            default_headers: HeaderMap::new(),
            tls: TlsConfig::default(),
        }
    }
}

impl HttpConfig {
    /// Set the response-header deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect deadline.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the default user agent.
    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace TLS settings.
    #[must_use]
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Validates the configuration for correctness and consistency
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a timeout is zero or exceeds one hour,
    /// or if the user agent is empty or not a valid header value.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(timeout) = self.timeout {
            ConfigValidator::validate_timeout(timeout, "timeout")?;
        }
        ConfigValidator::validate_timeout(self.connect_timeout, "connect_timeout")?;
        ConfigValidator::validate_user_agent(&self.user_agent)?;
        Ok(())
    }
}

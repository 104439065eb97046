//! Configuration validation

use std::time::Duration;

use http::HeaderValue;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid timeout value: {0}")]
    InvalidTimeout(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParameter(String),
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate timeout duration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTimeout` if:
    /// - The timeout duration is zero
    /// - The timeout duration exceeds 1 hour (3600 seconds)
    pub fn validate_timeout(timeout: Duration, name: &str) -> Result<(), ConfigurationError> {
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot be zero"
            )));
        }

        if timeout.as_secs() > 3600 {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot exceed 1 hour"
            )));
        }

        Ok(())
    }

    /// Validate the default user agent
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidParameter` if the user agent is
    /// empty or cannot be sent as a header value.
    pub fn validate_user_agent(user_agent: &str) -> Result<(), ConfigurationError> {
        if user_agent.is_empty() {
            return Err(ConfigurationError::InvalidParameter(
                "user agent cannot be empty".to_string(),
            ));
        }
        HeaderValue::from_str(user_agent).map_err(|e| {
            ConfigurationError::InvalidParameter(format!("user agent is not a header value: {e}"))
        })?;
        Ok(())
    }
}

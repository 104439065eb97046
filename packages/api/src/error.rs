//! API error type

use thiserror::Error;

use crate::types::ApiFailure;

/// Errors returned by [`ApiClient`](crate::ApiClient) calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// The exchange itself failed: transport, timeout, body, or JSON parsing.
    #[error(transparent)]
    Http(#[from] wxhttp_client::Error),

    /// The request payload could not be serialized.
    #[error("failed to serialize request payload: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The response parsed as JSON but did not fit the requested result type.
    #[error("failed to decode api result: {0}")]
    Decode(#[source] serde_json::Error),

    /// The API reported a non-zero `errcode`.
    #[error(transparent)]
    Api(#[from] ApiFailure),
}

impl ApiError {
    /// The domain failure, if the API rejected the call.
    #[must_use]
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            ApiError::Api(failure) => Some(failure),
            _ => None,
        }
    }

    /// The `errcode` of a domain failure.
    #[must_use]
    pub fn errcode(&self) -> Option<i64> {
        self.failure().map(|failure| failure.errcode)
    }
}

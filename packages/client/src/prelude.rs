//! Essential types for issuing requests and reading responses.

// Request and response types
pub use crate::http::{BodyStream, Params, RawEncoding, RequestBody, RequestOptions, Response};

// Error types
pub use crate::error::{BoxError, Error, Result};

// Client and configuration
pub use crate::client::{HttpClient, global_client, init_global_client, request};
pub use crate::config::{HttpConfig, TlsConfig};

// Multipart forms
pub use crate::multipart::{Form, Part};

// HTTP standard types from http crate
pub use ::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Version};

// URL handling
pub use url::Url;

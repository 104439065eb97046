//! Per-call options for API requests

use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;
use wxhttp_client::{Form, Params};

/// Describes one API call.
///
/// `path` is resolved against the client's base URL unless
/// [`base_url`](Self::base_url) overrides it for this call.
#[derive(Debug)]
pub struct ApiOptions {
    pub(crate) path: String,
    pub(crate) method: Method,
    pub(crate) params: Option<Params>,
    pub(crate) headers: HeaderMap,
    pub(crate) timeout: Option<Duration>,
    pub(crate) base_url: Option<String>,
    pub(crate) throw_on_error: bool,
    pub(crate) data: Option<serde_json::Result<Value>>,
    pub(crate) form: Option<Form>,
}

impl ApiOptions {
    /// A call to `path` with the given method.
    #[must_use]
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self {
            path: path.into(),
            method,
            params: None,
            headers: HeaderMap::new(),
            timeout: None,
            base_url: None,
            throw_on_error: true,
            data: None,
            form: None,
        }
    }

    #[must_use]
    pub fn get<P: Into<String>>(path: P) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post<P: Into<String>>(path: P) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach query parameters, replacing any set before.
    #[must_use]
    pub fn params<T: Into<Params>>(mut self, params: T) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Append one query pair, keeping earlier pairs in order.
    #[must_use]
    pub fn query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        let params = self.params.take().unwrap_or(Params::Pairs(Vec::new()));
        self.params = Some(params.append(key, value));
        self
    }

    /// Set a header, replacing earlier values of the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Extend headers, replacing values of the same name.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve `path` against `base_url` instead of the client's base.
    #[must_use]
    pub fn base_url<U: Into<String>>(mut self, base_url: U) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Whether a non-zero `errcode` fails the call (the default) or is
    /// returned in the result.
    #[must_use]
    pub fn throw_on_error(mut self, throw_on_error: bool) -> Self {
        self.throw_on_error = throw_on_error;
        self
    }

    /// Attach a JSON payload.
    ///
    /// Only objects and arrays are sent; other values leave the body empty.
    /// Serialization errors surface when the call is made.
    #[must_use]
    pub fn data<D: Serialize + ?Sized>(mut self, data: &D) -> Self {
        self.data = Some(serde_json::to_value(data));
        self
    }

    /// Attach a multipart form, for uploads through [`ApiClient::raw`](crate::ApiClient::raw).
    #[must_use]
    pub fn form(mut self, form: Form) -> Self {
        self.form = Some(form);
        self
    }

    /// The path as given
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

//! API client
//!
//! Wraps calls to a JSON API whose responses share an `errcode`/`errmsg`
//! envelope. A truthy `errcode` is a domain failure, raised as
//! [`ApiError::Api`] unless the call opts out with `throw_on_error(false)`.

use http::HeaderValue;
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wxhttp_client::{HttpClient, RequestOptions, Response};

use crate::error::ApiError;
use crate::options::ApiOptions;
use crate::types::{ApiFailure, ApiResult};

/// Default API origin
pub const WECHAT_API_BASE: &str = "https://api.weixin.qq.com";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Client for envelope-style JSON APIs
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: HttpClient,
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(HttpClient::default())
    }
}

impl ApiClient {
    /// Wrap `client`, targeting [`WECHAT_API_BASE`].
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: WECHAT_API_BASE.to_owned(),
        }
    }

    /// Target a different origin, e.g. a proxy or a test server.
    #[must_use]
    pub fn with_base_url<U: Into<String>>(mut self, base_url: U) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The base URL paths are resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call the API and parse the JSON envelope into [`ApiResult<T>`].
    ///
    /// # Errors
    ///
    /// - [`ApiError::Serialize`] if the payload cannot be serialized
    /// - [`ApiError::Http`] for transport failures and non-JSON bodies
    /// - [`ApiError::Api`] if `errcode` is truthy and `throw_on_error` is set
    /// - [`ApiError::Decode`] if the object does not fit `T`
    pub async fn request<T: DeserializeOwned>(
        &self,
        mut options: ApiOptions,
    ) -> Result<ApiResult<T>, ApiError> {
        let payload = match options.data.take() {
            Some(data) => json_body(data.map_err(ApiError::Serialize)?)?,
            None => None,
        };
        let throw_on_error = options.throw_on_error;
        let path = options.path.clone();

        let mut request = self.prepare(options);
        if let Some(payload) = payload {
            let mut headers = http::HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
            request = request.headers(headers).text(payload);
        }

        let mut response = self.client.execute(request).await?;
        let result: Value = response.read_as_json(None).await?;

        if let Some(failure) = ApiFailure::from_result(&result) {
            log::warn!("{path} failed with errcode {}: {}", failure.errcode, failure.errmsg);
            if throw_on_error {
                return Err(ApiError::Api(failure));
            }
        }

        serde_json::from_value(result).map_err(ApiError::Decode)
    }

    /// [`request`](Self::request) with the default map payload.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn call(&self, options: ApiOptions) -> Result<ApiResult, ApiError> {
        self.request(options).await
    }

    /// Issue the call and hand back the unread response.
    ///
    /// For endpoints that do not answer with the JSON envelope, such as media
    /// downloads. A form attached with [`ApiOptions::form`] is sent as the body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the exchange fails.
    pub async fn raw(&self, options: ApiOptions) -> Result<Response, ApiError> {
        Ok(self.client.execute(self.prepare(options)).await?)
    }

    fn prepare(&self, options: ApiOptions) -> RequestOptions {
        let ApiOptions {
            path,
            method,
            params,
            headers,
            timeout,
            base_url,
            form,
            ..
        } = options;

        log::debug!("{method} {path}");

        let base = base_url.as_deref().unwrap_or(&self.base_url);
        let mut request = RequestOptions::new(path)
            .method(method)
            .base_url(base)
            .headers(headers);
        if let Some(params) = params {
            request = request.params(params);
        }
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        if let Some(form) = form {
            request = request.body(form);
        }
        request
    }
}

/// Objects and arrays become the JSON body; anything else sends no body.
fn json_body(data: Value) -> Result<Option<String>, ApiError> {
    if !(data.is_object() || data.is_array()) {
        log::debug!("ignoring non-object payload");
        return Ok(None);
    }
    serde_json::to_string(&data)
        .map(Some)
        .map_err(ApiError::Serialize)
}

/// Call the API through the global HTTP client.
///
/// # Errors
///
/// See [`ApiClient::request`].
pub async fn request<T: DeserializeOwned>(options: ApiOptions) -> Result<ApiResult<T>, ApiError> {
    ApiClient::new(wxhttp_client::global_client().clone())
        .request(options)
        .await
}

/// Issue a raw call through the global HTTP client.
///
/// # Errors
///
/// See [`ApiClient::raw`].
pub async fn raw(options: ApiOptions) -> Result<Response, ApiError> {
    ApiClient::new(wxhttp_client::global_client().clone())
        .raw(options)
        .await
}

//! Response wrapper with single-use body materialization
//!
//! A [`Response`] is handed out as soon as the response head arrives. Its body
//! can be read exactly once, as a buffer, as decoded text, as JSON, or as the
//! raw chunk stream. Any later read fails with a consumed-body error.

use std::fmt;

use bytes::Bytes;
use futures::{StreamExt, stream};
use http::{HeaderMap, StatusCode, Version};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use url::Url;

use super::encoding::{Charset, resolve_charset};
use super::request::ByteStream;
use crate::error::{self, BoxError};
use crate::stream as body_stream;

/// An HTTP response whose body has not been read yet.
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    url: Url,
    body: Option<ByteStream>,
}

impl Response {
    pub(crate) fn from_hyper(res: http::Response<hyper::body::Incoming>, url: Url) -> Self {
        let (parts, incoming) = res.into_parts();
        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            url,
            body: Some(Box::pin(
                incoming
                    .into_data_stream()
                    .map(|chunk| chunk.map_err(BoxError::from)),
            )),
        }
    }

    /// Build a response around an in-memory body.
    ///
    /// Useful for feeding canned responses through code that expects a
    /// network response.
    #[must_use]
    pub fn from_parts(res: http::Response<Bytes>, url: Url) -> Self {
        let (parts, bytes) = res.into_parts();
        let body: ByteStream = if bytes.is_empty() {
            Box::pin(stream::empty::<Result<Bytes, BoxError>>())
        } else {
            Box::pin(stream::once(async move { Ok::<_, BoxError>(bytes) }))
        };
        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            url,
            body: Some(body),
        }
    }

    /// Get the `StatusCode` of this `Response`.
    #[inline]
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP `Version` of this `Response`.
    #[inline]
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get the `Headers` of this `Response`.
    #[inline]
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the final `Url` of this `Response`.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Declared body length from the `content-length` header.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(http::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    /// Returns true once the body has been handed out.
    #[inline]
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.body.is_none()
    }

    /// The charset label a string read would use.
    ///
    /// An explicit override wins over the `content-type` charset parameter,
    /// which wins over UTF-8.
    #[must_use]
    pub fn charset(&self, encoding: Option<&str>) -> String {
        resolve_charset(encoding, &self.headers)
    }

    /// Turn a response into an error if the server returned an error.
    ///
    /// # Errors
    ///
    /// Returns a status error for 4xx and 5xx responses.
    pub fn error_for_status(self) -> crate::Result<Self> {
        let status = self.status;
        if status.is_client_error() || status.is_server_error() {
            Err(error::status_code(self.url, status))
        } else {
            Ok(self)
        }
    }

    /// Take the raw body stream, e.g. to pipe it with [`copy_to`](crate::stream::copy_to).
    ///
    /// # Errors
    ///
    /// Returns a consumed error if the body was already taken.
    pub fn bytes_stream(&mut self) -> crate::Result<ByteStream> {
        self.body
            .take()
            .ok_or_else(|| error::consumed().with_url(self.url.clone()))
    }

    /// Read the whole body into one buffer.
    ///
    /// # Errors
    ///
    /// Returns a consumed error on a second read, or a body error if the
    /// stream fails.
    pub async fn read_as_buffer(&mut self) -> crate::Result<Bytes> {
        let body = self.bytes_stream()?;
        let url = self.url.clone();
        let bytes = body_stream::read_as_buffer(body)
            .await
            .map_err(|e| e.with_url(url))?;
        tracing::trace!(len = bytes.len(), "response body read");
        Ok(bytes)
    }

    /// Read the body as text.
    ///
    /// Raw encodings (`utf8`, `latin1`, `base64`, `hex`, ...) decode the bytes
    /// directly and keep any byte order mark. Other labels are transcoded via
    /// `encoding_rs` with the byte order mark removed.
    ///
    /// # Errors
    ///
    /// Returns a decode error for an unknown charset or malformed bytes, a
    /// consumed error on a second read, or a body error if the stream fails.
    pub async fn read_as_string(&mut self, encoding: Option<&str>) -> crate::Result<String> {
        let label = self.charset(encoding);
        let charset = Charset::from_label(&label).map_err(|e| e.with_url(self.url.clone()))?;

        match charset {
            Charset::Raw(raw) => {
                let body = self.bytes_stream()?;
                let url = self.url.clone();
                body_stream::read_as_string(body, Some(raw))
                    .await
                    .map_err(|e| e.with_url(url))
            }
            Charset::Named(_) => {
                let bytes = self.read_as_buffer().await?;
                charset
                    .decode(&bytes)
                    .map_err(|e| e.with_url(self.url.clone()))
            }
        }
    }

    /// Read the body as text and parse it as JSON.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the text is not valid JSON for `T`, plus the
    /// errors of [`read_as_string`](Self::read_as_string).
    pub async fn read_as_json<T: DeserializeOwned>(
        &mut self,
        encoding: Option<&str>,
    ) -> crate::Result<T> {
        let text = self.read_as_string(encoding).await?;
        serde_json::from_str(&text).map_err(|e| error::decode(e).with_url(self.url.clone()))
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("url", &self.url.as_str())
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

//! Request descriptor and body types
//!
//! A [`RequestOptions`] describes exactly one exchange: where to send it, which
//! query parameters and body to attach, and which transport options apply. It
//! is consumed by [`HttpClient::execute`](crate::HttpClient::execute).

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

use super::encoding::RawEncoding;
use super::url::{Params, apply_params, resolve_url};
use crate::config::TlsConfig;
use crate::error::{self, BoxError};
use crate::http::IntoUrl;

/// A boxed, sendable stream of body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send + 'static>>;

/// A streamed request body plus the headers it needs on the request.
///
/// Multipart forms use the headers to carry their boundary content type and,
/// when every part has a known size, the content length. They are merged onto
/// the outgoing request before any body byte is written.
pub struct BodyStream {
    stream: ByteStream,
    headers: HeaderMap,
}

impl BodyStream {
    /// Wrap any fallible byte stream.
    pub fn new<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            stream: Box::pin(stream.map_err(Into::into)),
            headers: HeaderMap::new(),
        }
    }

    /// Attach headers that must accompany this body.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Headers that accompany this body
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub(crate) fn into_parts(self) -> (HeaderMap, ByteStream) {
        (self.headers, self.stream)
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream")
            .field("headers", &self.headers)
            .field("stream", &"<ByteStream>")
            .finish()
    }
}

/// Request body types, highest precedence first.
pub enum RequestBody {
    /// Raw bytes sent as-is
    Bytes(Bytes),
    /// Text encoded with a raw encoding before sending
    Text {
        text: String,
        encoding: RawEncoding,
    },
    /// A stream piped into the request
    Stream(BodyStream),
}

impl RequestBody {
    fn precedence(&self) -> u8 {
        match self {
            RequestBody::Bytes(_) => 3,
            RequestBody::Text { .. } => 2,
            RequestBody::Stream(_) => 1,
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Bytes(bytes) => f
                .debug_tuple("Bytes")
                .field(&format!("{} bytes", bytes.len()))
                .finish(),
            RequestBody::Text { text, encoding } => f
                .debug_struct("Text")
                .field("len", &text.len())
                .field("encoding", encoding)
                .finish(),
            RequestBody::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
        }
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(bytes.into())
    }
}

impl From<&'static [u8]> for RequestBody {
    fn from(bytes: &'static [u8]) -> Self {
        RequestBody::Bytes(Bytes::from_static(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text {
            text,
            encoding: RawEncoding::Utf8,
        }
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::from(text.to_owned())
    }
}

impl From<BodyStream> for RequestBody {
    fn from(stream: BodyStream) -> Self {
        RequestBody::Stream(stream)
    }
}

/// Describes a single request/response exchange.
#[derive(Debug)]
pub struct RequestOptions {
    pub(crate) url: String,
    pub(crate) base_url: Option<Url>,
    pub(crate) params: Option<Params>,
    pub(crate) body: Option<RequestBody>,
    pub(crate) method: Method,
    pub(crate) headers: HeaderMap,
    pub(crate) timeout: Option<Duration>,
    pub(crate) tls: Option<TlsConfig>,

    /// Internal error state for deferred error handling
    pub(crate) error: Option<crate::Error>,
}

impl RequestOptions {
    /// Describe a `GET` request to `url`, absolute or relative to a base URL.
    #[must_use]
    pub fn new<U: Into<String>>(url: U) -> Self {
        Self {
            url: url.into(),
            base_url: None,
            params: None,
            body: None,
            method: Method::GET,
            headers: HeaderMap::new(),
            timeout: None,
            tls: None,
            error: None,
        }
    }

    /// Create a GET request
    #[must_use]
    pub fn get<U: Into<String>>(url: U) -> Self {
        Self::new(url)
    }

    /// Create a POST request
    #[must_use]
    pub fn post<U: Into<String>>(url: U) -> Self {
        Self::new(url).method(Method::POST)
    }

    /// Set the HTTP method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Resolve relative URLs against `base`.
    #[must_use = "Request builder methods return a new request and should be used"]
    pub fn base_url<U: IntoUrl>(mut self, base: U) -> Self {
        match base.into_url() {
            Ok(url) => self.base_url = Some(url),
            Err(e) => self.defer(e),
        }
        self
    }

    /// Attach query parameters, replacing any set before.
    #[must_use]
    pub fn params<P: Into<Params>>(mut self, params: P) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Append one query pair, keeping earlier pairs and their order.
    #[must_use]
    pub fn query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        let params = self.params.take().unwrap_or(Params::Pairs(Vec::new()));
        self.params = Some(params.append(key, value));
        self
    }

    /// Add a header, appending to any existing values of the same name
    #[must_use = "Request builder methods return a new request and should be used"]
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: Into<http::Error>,
        V: TryInto<HeaderValue>,
        V::Error: Into<http::Error>,
    {
        let name = key.try_into().map_err(Into::into);
        let value = value.try_into().map_err(Into::into);
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) | (_, Err(e)) => self.defer(error::builder(e)),
        }
        self
    }

    /// Extend headers, replacing values of the same name
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Fail the exchange if response headers have not arrived within `timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the client's TLS settings for this request.
    #[must_use]
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Attach a body.
    ///
    /// When several bodies are supplied the one with the highest precedence
    /// wins: bytes, then text, then stream.
    #[must_use]
    pub fn body<B: Into<RequestBody>>(mut self, body: B) -> Self {
        let body = body.into();
        let keep_current = self
            .body
            .as_ref()
            .is_some_and(|current| current.precedence() > body.precedence());
        if !keep_current {
            self.body = Some(body);
        }
        self
    }

    /// Set body as bytes
    #[must_use]
    pub fn bytes<B: Into<Bytes>>(self, bytes: B) -> Self {
        self.body(RequestBody::Bytes(bytes.into()))
    }

    /// Set body as UTF-8 text
    #[must_use]
    pub fn text<S: Into<String>>(self, text: S) -> Self {
        self.body(RequestBody::from(text.into()))
    }

    /// Set body as text encoded with a raw encoding label (`utf8`, `latin1`, `base64`, ...)
    #[must_use = "Request builder methods return a new request and should be used"]
    pub fn text_with_encoding<S: Into<String>>(mut self, text: S, encoding: &str) -> Self {
        match encoding.parse::<RawEncoding>() {
            Ok(encoding) => self.body(RequestBody::Text {
                text: text.into(),
                encoding,
            }),
            Err(e) => {
                self.defer(e);
                self
            }
        }
    }

    /// Pipe a byte stream as the body.
    #[must_use]
    pub fn stream<S: Into<BodyStream>>(self, stream: S) -> Self {
        self.body(RequestBody::Stream(stream.into()))
    }

    /// The URL as given, before resolution
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Resolve the final URL: base joining, then query parameters.
    ///
    /// # Errors
    ///
    /// Returns the first deferred builder error, or a builder error if the URL
    /// cannot be resolved.
    pub fn resolve_url(&self) -> crate::Result<Url> {
        let url = resolve_url(&self.url, self.base_url.as_ref())?;
        Ok(apply_params(url, self.params.as_ref()))
    }

    /// Returns true if a builder step failed
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    fn defer(&mut self, err: crate::Error) {
        // the first failure is the one reported
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl<S, E> From<S> for BodyStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    fn from(stream: S) -> Self {
        BodyStream::new(stream)
    }
}

//! Part construction for multipart form fields

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use futures::Stream;
use http::HeaderMap;
use mime::Mime;

use super::types::{Part, PartMetadata, PartValue};
use crate::error::{self, BoxError};
use crate::http::request::BodyStream;

impl Part {
    /// Makes a text parameter.
    pub fn text<T>(value: T) -> Part
    where
        T: Into<Cow<'static, str>>,
    {
        let bytes = match value.into() {
            Cow::Borrowed(slice) => Bytes::from_static(slice.as_bytes()),
            Cow::Owned(string) => Bytes::from(string),
        };
        let len = bytes.len() as u64;
        Part::new(PartValue::Bytes(bytes), Some(len))
    }

    /// Makes a new parameter from arbitrary bytes.
    pub fn bytes<T>(value: T) -> Part
    where
        T: Into<Cow<'static, [u8]>>,
    {
        let bytes = match value.into() {
            Cow::Borrowed(slice) => Bytes::from_static(slice),
            Cow::Owned(vec) => Bytes::from(vec),
        };
        let len = bytes.len() as u64;
        Part::new(PartValue::Bytes(bytes), Some(len))
    }

    /// Makes a new parameter from a stream of unknown length.
    ///
    /// A form holding such a part cannot announce its `content-length`.
    pub fn stream<S, E>(value: S) -> Part
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let (_, stream) = BodyStream::new(value).into_parts();
        Part::new(PartValue::Stream(stream), None)
    }

    /// Makes a new parameter from a stream whose total length is known.
    pub fn stream_with_length<S, E>(value: S, length: u64) -> Part
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let (_, stream) = BodyStream::new(value).into_parts();
        Part::new(PartValue::Stream(stream), Some(length))
    }

    fn new(value: PartValue, body_length: Option<u64>) -> Part {
        Part {
            meta: PartMetadata::new(),
            value,
            body_length,
        }
    }

    /// Tries to set the mime of this part.
    ///
    /// # Errors
    ///
    /// Returns a builder error if `mime` is not a valid media type.
    pub fn mime_str(self, mime: &str) -> crate::Result<Part> {
        Ok(self.mime(mime.parse().map_err(error::builder)?))
    }

    /// Sets the mime of this part.
    #[must_use]
    pub fn mime(mut self, mime: Mime) -> Part {
        self.meta.mime = Some(mime);
        self
    }

    /// Sets the filename, builder style.
    #[must_use]
    pub fn file_name<T>(mut self, filename: T) -> Part
    where
        T: Into<Cow<'static, str>>,
    {
        self.meta.file_name = Some(filename.into());
        self
    }

    /// Sets custom headers for the part.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Part {
        self.meta.headers = headers;
        self
    }

    pub(super) fn value_len(&self) -> Option<u64> {
        self.body_length
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Part");
        dbg.field(
            "value",
            &match &self.value {
                PartValue::Bytes(bytes) => format!("{} bytes", bytes.len()),
                PartValue::Stream(_) => "<ByteStream>".to_owned(),
            },
        );
        self.meta.fmt_fields(&mut dbg);
        dbg.finish()
    }
}

//! Form construction and serialization for multipart/form-data

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use futures::{StreamExt, stream};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};

use super::types::{Form, Part, PartValue, PercentEncoding, gen_boundary};
use crate::error::BoxError;
use crate::http::request::{BodyStream, ByteStream, RequestBody};

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Creates a new Form without any content.
    #[must_use]
    pub fn new() -> Form {
        Form {
            boundary: gen_boundary(),
            fields: Vec::new(),
            percent_encoding: PercentEncoding::PathSegment,
        }
    }

    /// Get the boundary that this form will use.
    #[inline]
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Add a data field with supplied name and value.
    #[must_use]
    pub fn text<T, U>(self, name: T, value: U) -> Form
    where
        T: Into<Cow<'static, str>>,
        U: Into<Cow<'static, str>>,
    {
        self.part(name, Part::text(value))
    }

    /// Adds a customized Part.
    #[must_use]
    pub fn part<T>(mut self, name: T, part: Part) -> Form
    where
        T: Into<Cow<'static, str>>,
    {
        self.fields.push((name.into(), part));
        self
    }

    /// Configure this form to percent-encode using the `path-segment` rules.
    #[must_use]
    pub fn percent_encode_path_segment(mut self) -> Form {
        self.percent_encoding = PercentEncoding::PathSegment;
        self
    }

    /// Configure this form to percent-encode using the `attr-char` rules.
    #[must_use]
    pub fn percent_encode_attr_chars(mut self) -> Form {
        self.percent_encoding = PercentEncoding::AttrChar;
        self
    }

    /// Configure this form to skip percent-encoding
    #[must_use]
    pub fn percent_encode_noop(mut self) -> Form {
        self.percent_encoding = PercentEncoding::NoOp;
        self
    }

    /// Total encoded length, if every part's length is known.
    #[must_use]
    pub fn compute_length(&self) -> Option<u64> {
        let mut length = 0u64;
        for (name, field) in &self.fields {
            let header = self.percent_encoding.encode_headers(name, &field.meta);
            // --boundary\r\n + headers + \r\n\r\n + body + \r\n
            length += 2 + self.boundary.len() as u64 + 2;
            length += header.len() as u64 + 4;
            length += field.value_len()? + 2;
        }
        // --boundary--\r\n
        length += 2 + self.boundary.len() as u64 + 4;
        Some(length)
    }

    /// Headers the request must carry for this body.
    ///
    /// Always includes the boundary `content-type`; includes `content-length`
    /// when [`compute_length`](Self::compute_length) knows it.
    #[must_use]
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let content_type = format!("multipart/form-data; boundary={}", self.boundary);
        if let Ok(value) = HeaderValue::from_str(&content_type) {
            headers.insert(CONTENT_TYPE, value);
        }
        if let Some(length) = self.compute_length() {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        }
        headers
    }

    /// Serialize the form into a chunk stream, parts in insertion order.
    #[must_use]
    pub fn into_stream(self) -> ByteStream {
        let Form {
            boundary,
            fields,
            percent_encoding,
        } = self;

        let mut segments: Vec<ByteStream> = Vec::with_capacity(fields.len() * 3 + 1);
        for (name, part) in fields {
            let mut head = Vec::new();
            head.extend_from_slice(b"--");
            head.extend_from_slice(boundary.as_bytes());
            head.extend_from_slice(b"\r\n");
            head.extend_from_slice(&percent_encoding.encode_headers(&name, &part.meta));
            head.extend_from_slice(b"\r\n\r\n");
            segments.push(once(Bytes::from(head)));

            segments.push(match part.value {
                PartValue::Bytes(bytes) => once(bytes),
                PartValue::Stream(stream) => stream,
            });
            segments.push(once(Bytes::from_static(b"\r\n")));
        }
        segments.push(once(Bytes::from(format!("--{boundary}--\r\n"))));

        Box::pin(stream::iter(segments).flatten())
    }
}

fn once(bytes: Bytes) -> ByteStream {
    Box::pin(stream::once(async move { Ok::<_, BoxError>(bytes) }))
}

impl From<Form> for BodyStream {
    fn from(form: Form) -> Self {
        let headers = form.headers();
        BodyStream::new(form.into_stream()).with_headers(headers)
    }
}

impl From<Form> for RequestBody {
    fn from(form: Form) -> Self {
        RequestBody::Stream(form.into())
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("boundary", &self.boundary)
            .field("parts", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::stream::read_as_buffer;

    #[tokio::test]
    async fn test_form_layout() {
        let mut form = Form::new()
            .text("type", "image")
            .part("media", Part::bytes(&b"\x89PNG"[..]).file_name("a.png").mime(mime::IMAGE_PNG));
        form.boundary = "XBOUNDARY".to_owned();

        let expected_len = form.compute_length().expect("all lengths known");
        let body = read_as_buffer(form.into_stream()).await.expect("serialize");

        let expected = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"type\"\r\n\r\n",
            "image\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"media\"; filename=\"a.png\"\r\n",
            "Content-Type: image/png\r\n\r\n",
        );
        assert!(body.starts_with(expected.as_bytes()));
        assert!(body.ends_with(b"\x89PNG\r\n--XBOUNDARY--\r\n"));
        assert_eq!(body.len() as u64, expected_len);
    }

    #[tokio::test]
    async fn test_empty_form() {
        let form = Form::new();
        let boundary = form.boundary().to_owned();
        let expected_len = form.compute_length().expect("known");
        let body = read_as_buffer(form.into_stream()).await.expect("serialize");
        assert_eq!(body, Bytes::from(format!("--{boundary}--\r\n")));
        assert_eq!(body.len() as u64, expected_len);
    }

    #[test]
    fn test_headers_carry_boundary_and_length() {
        let form = Form::new().text("k", "v");
        let headers = form.headers();
        let content_type = headers[CONTENT_TYPE].to_str().expect("ascii");
        assert_eq!(content_type, format!("multipart/form-data; boundary={}", form.boundary()));
        let length: u64 = headers[CONTENT_LENGTH].to_str().expect("ascii").parse().expect("number");
        assert_eq!(Some(length), form.compute_length());
    }

    #[test]
    fn test_unknown_stream_length_omits_content_length() {
        let chunks = stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(b"abc"))]);
        let form = Form::new().part("media", Part::stream(chunks));
        assert_eq!(form.compute_length(), None);
        assert!(form.headers().get(CONTENT_LENGTH).is_none());
        assert!(form.headers().get(CONTENT_TYPE).is_some());

        let chunks = stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(b"abc"))]);
        let form = Form::new().part("media", Part::stream_with_length(chunks, 3));
        assert!(form.compute_length().is_some());
    }

    #[test]
    fn test_body_stream_from_form_keeps_headers() {
        let form = Form::new().text("k", "v");
        let boundary = form.boundary().to_owned();
        let body = BodyStream::from(form);
        let content_type = body.headers()[CONTENT_TYPE].to_str().expect("ascii");
        assert!(content_type.ends_with(&boundary));
    }
}

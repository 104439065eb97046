//! Core types for multipart/form-data bodies

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use http::HeaderMap;
use mime::Mime;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

use crate::http::request::ByteStream;

/// A streaming multipart/form-data request body.
pub struct Form {
    pub(super) boundary: String,
    pub(super) fields: Vec<(Cow<'static, str>, Part)>,
    pub(super) percent_encoding: PercentEncoding,
}

/// A field in a multipart form.
pub struct Part {
    pub(super) meta: PartMetadata,
    pub(super) value: PartValue,
    pub(super) body_length: Option<u64>,
}

pub(super) enum PartValue {
    Bytes(Bytes),
    Stream(ByteStream),
}

pub(crate) struct PartMetadata {
    pub(crate) mime: Option<Mime>,
    pub(crate) file_name: Option<Cow<'static, str>>,
    pub(crate) headers: HeaderMap,
}

/// How field names are escaped in `Content-Disposition`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PercentEncoding {
    /// Percent-encode using the `path-segment` rules.
    PathSegment,
    /// Percent-encode using the `attr-char` rules.
    AttrChar,
    /// Skip percent-encoding.
    NoOp,
}

const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

// RFC 5987 attr-char minus ALPHA / DIGIT, which NON_ALPHANUMERIC already keeps
const ATTR_CHAR_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

impl PercentEncoding {
    pub(crate) fn encode_headers(self, name: &str, field: &PartMetadata) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"Content-Disposition: form-data; ");

        match self.percent_encode(name) {
            Cow::Borrowed(value) => {
                buf.extend_from_slice(b"name=\"");
                buf.extend_from_slice(value.as_bytes());
                buf.extend_from_slice(b"\"");
            }
            Cow::Owned(value) => {
                buf.extend_from_slice(b"name*=utf-8''");
                buf.extend_from_slice(value.as_bytes());
            }
        }

        // RFC 7578 forbids `filename*=`, so the file name is quoted instead
        if let Some(filename) = &field.file_name {
            buf.extend_from_slice(b"; filename=\"");
            let legal_filename = filename
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\r', "\\\r")
                .replace('\n', "\\\n");
            buf.extend_from_slice(legal_filename.as_bytes());
            buf.extend_from_slice(b"\"");
        }

        if let Some(mime) = &field.mime {
            buf.extend_from_slice(b"\r\nContent-Type: ");
            buf.extend_from_slice(mime.as_ref().as_bytes());
        }

        for (k, v) in &field.headers {
            buf.extend_from_slice(b"\r\n");
            buf.extend_from_slice(k.as_str().as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(v.as_bytes());
        }
        buf
    }

    fn percent_encode(self, value: &str) -> Cow<'_, str> {
        use percent_encoding::utf8_percent_encode as percent_encode;

        match self {
            Self::PathSegment => percent_encode(value, PATH_SEGMENT_ENCODE_SET).into(),
            Self::AttrChar => percent_encode(value, ATTR_CHAR_ENCODE_SET).into(),
            Self::NoOp => value.into(),
        }
    }
}

impl PartMetadata {
    pub(crate) fn new() -> Self {
        PartMetadata {
            mime: None,
            file_name: None,
            headers: HeaderMap::new(),
        }
    }

    pub(crate) fn fmt_fields(&self, dbg: &mut fmt::DebugStruct<'_, '_>) {
        if let Some(ref mime) = self.mime {
            dbg.field("mime", mime);
        }
        if let Some(ref filename) = self.file_name {
            dbg.field("filename", filename);
        }
        if !self.headers.is_empty() {
            dbg.field("headers", &self.headers);
        }
    }
}

/// Generate a random boundary string for multipart forms
pub(crate) fn gen_boundary() -> String {
    let a = fastrand::u64(..);
    let b = fastrand::u64(..);
    let c = fastrand::u64(..);
    let d = fastrand::u64(..);

    format!("{a:016x}-{b:016x}-{c:016x}-{d:016x}")
}

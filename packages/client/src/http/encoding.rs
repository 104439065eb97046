//! Text encodings for request and response bodies
//!
//! Two families of encodings are handled here:
//!
//! - **Raw encodings** (`ascii`, `utf8`, `utf16le`, `latin1`, `base64`, `base64url`,
//!   `hex` and their aliases) map bytes to text directly. No byte-order mark is
//!   stripped on this path.
//! - **Named charsets** (anything else, e.g. `gbk`, `shift_jis`, `UTF-8`) are
//!   transcoded through [`encoding_rs`], which removes a leading BOM and rejects
//!   malformed input.

use std::sync::LazyLock;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use encoding_rs::Encoding;
use http::HeaderMap;
use regex::Regex;

use crate::error::{self, MalformedCharset, UnknownCharset};

/// Charset used when neither an override nor a `content-type` charset is present.
pub const DEFAULT_CHARSET: &str = "utf-8";

static CHARSET_PARAM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)charset=([A-Za-z0-9_\-]+)").ok());

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(true)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const BASE64: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

const BASE64_URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// An encoding that converts between bytes and text without a transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RawEncoding {
    /// 7-bit ASCII; the high bit of each byte is cleared when decoding
    Ascii,
    /// UTF-8, invalid sequences replaced with U+FFFD
    #[default]
    Utf8,
    /// UTF-16 little endian (`utf16le`, `ucs2`, `ucs-2`)
    Utf16Le,
    /// ISO-8859-1 (`latin1`, `binary`)
    Latin1,
    /// Standard base64 text of the bytes, padded
    Base64,
    /// URL-safe base64 text of the bytes, unpadded
    Base64Url,
    /// Lowercase hexadecimal text of the bytes
    Hex,
}

impl RawEncoding {
    /// Look up a raw encoding by its exact label.
    ///
    /// Labels are matched as written (`utf8`, `utf-8`, `ucs-2`, ...); other
    /// spellings such as `UTF-8` are left to the charset transcoder.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let encoding = match label {
            "ascii" => Self::Ascii,
            "utf8" | "utf-8" => Self::Utf8,
            "utf16le" | "ucs2" | "ucs-2" => Self::Utf16Le,
            "latin1" | "binary" => Self::Latin1,
            "base64" => Self::Base64,
            "base64url" => Self::Base64Url,
            "hex" => Self::Hex,
            _ => return None,
        };
        Some(encoding)
    }

    /// Canonical label of this encoding
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Utf8 => "utf8",
            Self::Utf16Le => "utf16le",
            Self::Latin1 => "latin1",
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
            Self::Hex => "hex",
        }
    }

    /// Render bytes as text under this encoding.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Ascii => bytes.iter().map(|b| char::from(b & 0x7f)).collect(),
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Utf16Le => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Base64 => BASE64.encode(bytes),
            Self::Base64Url => BASE64_URL.encode(bytes),
            Self::Hex => hex::encode(bytes),
        }
    }

    /// Turn text into bytes under this encoding.
    ///
    /// # Errors
    ///
    /// Returns a builder error when `text` is not valid base64 or hex for the
    /// corresponding encodings.
    pub fn encode(self, text: &str) -> crate::Result<Vec<u8>> {
        let bytes = match self {
            Self::Ascii | Self::Latin1 => text.chars().map(|c| (u32::from(c) & 0xff) as u8).collect(),
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Base64 => BASE64.decode(text).map_err(error::builder)?,
            Self::Base64Url => BASE64_URL.decode(text).map_err(error::builder)?,
            Self::Hex => hex::decode(text).map_err(error::builder)?,
        };
        Ok(bytes)
    }
}

impl std::str::FromStr for RawEncoding {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| error::builder(UnknownCharset(s.to_owned())))
    }
}

/// A resolved response charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// Decoded directly from bytes
    Raw(RawEncoding),
    /// Transcoded through `encoding_rs`
    Named(&'static Encoding),
}

impl Charset {
    /// Classify a charset label.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the label is neither a raw encoding nor a
    /// charset known to `encoding_rs`.
    pub fn from_label(label: &str) -> crate::Result<Self> {
        if let Some(raw) = RawEncoding::from_label(label) {
            return Ok(Self::Raw(raw));
        }
        Encoding::for_label(label.trim().as_bytes())
            .map(Self::Named)
            .ok_or_else(|| error::decode(UnknownCharset(label.to_owned())))
    }

    /// Decode a complete body.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the bytes are malformed for a named charset.
    pub fn decode(self, bytes: &[u8]) -> crate::Result<String> {
        match self {
            Self::Raw(raw) => Ok(raw.decode(bytes)),
            Self::Named(encoding) => {
                let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
                if had_errors {
                    return Err(error::decode(MalformedCharset(encoding.name())));
                }
                Ok(text.into_owned())
            }
        }
    }
}

/// Extract the `charset` parameter of a `content-type` value.
#[must_use]
pub fn charset_param(content_type: &str) -> Option<&str> {
    CHARSET_PARAM
        .as_ref()?
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Resolve the charset label for a response.
///
/// An explicit, non-empty override wins; otherwise the `content-type` header's
/// `charset` parameter is used; otherwise [`DEFAULT_CHARSET`].
#[must_use]
pub fn resolve_charset(override_label: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(label) = override_label.filter(|label| !label.is_empty()) {
        return label.to_owned();
    }

    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(charset_param)
        .unwrap_or(DEFAULT_CHARSET)
        .to_owned()
}

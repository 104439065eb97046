/// A marker type to indicate that a request timed out.
#[derive(Debug, thiserror::Error)]
#[error("timed out")]
pub struct TimedOut;

/// A marker type to indicate that a URL scheme or host was unusable.
#[derive(Debug, thiserror::Error)]
#[error("URL has no host or an unsupported scheme")]
pub struct BadScheme;

/// A marker type to indicate that a single-use body was read twice.
#[derive(Debug, thiserror::Error)]
#[error("body was already consumed by an earlier read")]
pub struct BodyConsumed;

/// The charset label is neither a raw encoding nor known to the transcoder.
#[derive(Debug, thiserror::Error)]
#[error("unknown charset: {0}")]
pub struct UnknownCharset(pub String);

/// The bytes are not a valid sequence for the named charset.
#[derive(Debug, thiserror::Error)]
#[error("malformed byte sequence for charset {0}")]
pub struct MalformedCharset(pub &'static str);

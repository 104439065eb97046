use super::types::{BoxError, Error, Kind};

/// Creates an `Error` for an invalid request descriptor.
pub(crate) fn builder<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e)
}

/// Creates an `Error` for a transport failure.
pub(crate) fn request<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Request).with(e)
}

/// Creates an `Error` for a TCP or TLS connection failure.
pub(crate) fn connect<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Connect).with(e)
}

/// Creates an `Error` for an elapsed request timeout.
pub(crate) fn timeout() -> Error {
    Error::new(Kind::Timeout).with(super::helpers::TimedOut)
}

/// Creates an `Error` for a body error.
pub(crate) fn body<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Body).with(e)
}

/// Creates an `Error` for a decode error.
pub(crate) fn decode<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Decode).with(e)
}

/// Creates an `Error` for a second read of a single-use body.
pub(crate) fn consumed() -> Error {
    Error::new(Kind::Consumed).with(super::helpers::BodyConsumed)
}

pub(crate) fn status_code(url: url::Url, status: http::StatusCode) -> Error {
    Error::new(Kind::Status(status)).with_url(url)
}

pub(crate) fn url_bad_scheme(url: url::Url) -> Error {
    Error::new(Kind::Builder)
        .with(super::helpers::BadScheme)
        .with_url(url)
}

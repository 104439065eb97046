use std::error::Error as StdError;
use std::io;

use super::helpers::TimedOut;
use super::types::{Error, Kind};

impl Error {
    /// Returns true if the error comes from an invalid request descriptor.
    #[must_use]
    pub fn is_builder(&self) -> bool {
        matches!(self.kind(), Kind::Builder)
    }

    /// Returns true if the error is from `Response::error_for_status`.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self.kind(), Kind::Status(_))
    }

    /// Returns true if the error is related to a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        if matches!(self.kind(), Kind::Timeout) {
            return true;
        }

        let mut source = self.source();

        while let Some(err) = source {
            if err.is::<TimedOut>() {
                return true;
            }
            if let Some(hyper_err) = err.downcast_ref::<hyper::Error>()
                && hyper_err.is_timeout()
            {
                return true;
            }
            if let Some(io) = err.downcast_ref::<io::Error>()
                && io.kind() == io::ErrorKind::TimedOut
            {
                return true;
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the error is related to sending the request
    #[must_use]
    pub fn is_request(&self) -> bool {
        matches!(self.kind(), Kind::Request)
    }

    /// Returns true if the error is related to connect
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self.kind(), Kind::Connect)
    }

    /// Returns true if the error is related to the request or response body
    #[must_use]
    pub fn is_body(&self) -> bool {
        matches!(self.kind(), Kind::Body)
    }

    /// Returns true if the error is related to decoding the response's body
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self.kind(), Kind::Decode)
    }

    /// Returns true if a response body was read more than once
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        matches!(self.kind(), Kind::Consumed)
    }

    /// Returns the status code, if the error was generated from a response.
    #[must_use]
    pub fn status(&self) -> Option<http::StatusCode> {
        match self.kind() {
            Kind::Status(code) => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error;

    #[test]
    fn test_timeout_classification() {
        let err = error::timeout();
        assert!(err.is_timeout());
        assert!(!err.is_request());

        let io_timeout = error::request(io::Error::new(io::ErrorKind::TimedOut, "slow peer"));
        assert!(io_timeout.is_timeout());
        assert!(io_timeout.is_request());
    }

    #[test]
    fn test_status_classification() {
        let url = url::Url::parse("http://example.com/missing").expect("valid url");
        let err = error::status_code(url.clone(), http::StatusCode::NOT_FOUND);
        assert!(err.is_status());
        assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
        assert_eq!(err.url(), Some(&url));
        assert!(err.to_string().contains("client error"));
    }

    #[test]
    fn test_consumed_display() {
        let err = error::consumed();
        assert!(err.is_consumed());
        assert_eq!(err.to_string(), "response body already consumed");
        assert!(err.source().is_some());
    }
}

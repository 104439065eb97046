//! Connection establishment
//!
//! Every exchange dials a fresh connection: plain TCP for `http`, rustls over
//! TCP for `https`. The HTTP/1.1 connection driver runs on its own task and
//! ends once the response body has been read or dropped.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use hyper::client::conn::http1::{self, SendRequest};
use hyper_util::rt::TokioIo;
use rustls::ClientConfig;
use tokio::io::{AsyncRead, AsyncWrite};
use url::Url;

use crate::error::{self, BoxError};
use crate::http::url::is_secure_scheme;

pub mod tcp;
pub mod tls;

pub use tls::build_client_config;

/// Body type carried on every outgoing request
pub(crate) type OutgoingBody = UnsyncBoxBody<Bytes, BoxError>;

/// How an exchange reaches its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Tls,
}

impl Transport {
    /// `https` selects TLS; every other scheme is plain TCP.
    #[must_use]
    pub fn for_url(url: &Url) -> Self {
        if is_secure_scheme(url) {
            Transport::Tls
        } else {
            Transport::Plain
        }
    }
}

/// Dial `url` and perform the HTTP/1.1 handshake.
///
/// `tls_config` is only invoked for TLS transports.
pub(crate) async fn connect<F>(
    url: &Url,
    connect_timeout: Duration,
    tls_config: F,
) -> crate::Result<SendRequest<OutgoingBody>>
where
    F: FnOnce() -> crate::Result<Arc<ClientConfig>>,
{
    let (host, port) = tcp::target(url)?;
    let transport = Transport::for_url(url);
    tracing::trace!("connecting to {host}:{port} over {transport:?}");

    let stream = tcp::connect_tcp(&host, port, connect_timeout).await?;
    match transport {
        Transport::Plain => handshake(stream).await,
        Transport::Tls => {
            let stream = tls::connect_tls(stream, &host, tls_config()?).await?;
            handshake(stream).await
        }
    }
}

async fn handshake<T>(io: T) -> crate::Result<SendRequest<OutgoingBody>>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (sender, connection) = http1::handshake(TokioIo::new(io))
        .await
        .map_err(error::connect)?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::debug!("connection closed with error: {e}");
        }
    });

    Ok(sender)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_for_scheme() {
        let https = Url::parse("https://api.example.com/").expect("url");
        let http = Url::parse("http://api.example.com/").expect("url");
        let ws = Url::parse("ws://api.example.com/").expect("url");
        assert_eq!(Transport::for_url(&https), Transport::Tls);
        assert_eq!(Transport::for_url(&http), Transport::Plain);
        assert_eq!(Transport::for_url(&ws), Transport::Plain);
    }
}

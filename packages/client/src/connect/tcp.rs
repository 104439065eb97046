//! TCP connection establishment

use std::time::Duration;

use tokio::net::TcpStream;
use url::{Host, Url};

use crate::error;
use crate::http::url::extract_port;

/// Host and port to dial for `url`, IPv6 literals without brackets.
pub(crate) fn target(url: &Url) -> crate::Result<(String, u16)> {
    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_owned(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        None => return Err(error::url_bad_scheme(url.clone())),
    };
    Ok((host, extract_port(url)))
}

/// Open a TCP stream to `host:port` within `connect_timeout`.
pub(crate) async fn connect_tcp(
    host: &str,
    port: u16,
    connect_timeout: Duration,
) -> crate::Result<TcpStream> {
    let stream = tokio::time::timeout(connect_timeout, TcpStream::connect((host, port)))
        .await
        .map_err(|_| error::timeout())?
        .map_err(error::connect)?;

    if let Err(e) = stream.set_nodelay(true) {
        tracing::trace!("failed to set TCP_NODELAY on {host}:{port}: {e}");
    }
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_defaults_port_by_scheme() {
        let url = Url::parse("https://api.example.com/x").expect("url");
        assert_eq!(target(&url).expect("target"), ("api.example.com".to_owned(), 443));

        let url = Url::parse("http://[::1]:8080/").expect("url");
        assert_eq!(target(&url).expect("target"), ("::1".to_owned(), 8080));
    }

    #[tokio::test]
    async fn test_connect_refused_is_connect_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);

        let err = connect_tcp("127.0.0.1", port, Duration::from_secs(5))
            .await
            .expect_err("nothing is listening");
        assert!(err.is_connect());
    }
}

//! TLS over TCP using rustls

use std::net::IpAddr;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, ServerName};
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::config::TlsConfig;
use crate::error;

/// Build the rustls client configuration for `config`.
///
/// # Errors
///
/// Returns a builder error if an extra root certificate cannot be parsed or
/// the resulting trust store is empty.
pub fn build_client_config(config: &TlsConfig) -> crate::Result<Arc<ClientConfig>> {
    let mut root_store = RootCertStore::empty();

    if config.use_native_certs {
        let cert_result = rustls_native_certs::load_native_certs();
        for err in &cert_result.errors {
            tracing::warn!("Certificate load error: {}", err);
        }
        let (added, ignored) = root_store.add_parsable_certificates(cert_result.certs);
        tracing::debug!("Loaded {added} system certificates ({ignored} ignored)");
    }

    if config.use_webpki_roots {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    for pem in &config.extra_root_certs_pem {
        for cert in parse_pem_certs(pem)? {
            root_store.add(cert).map_err(error::builder)?;
        }
    }

    if root_store.is_empty() {
        return Err(error::builder("no trusted root certificates configured"));
    }

    let mut client_config =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(error::builder)?
            .with_root_certificates(root_store)
            .with_no_client_auth();
    client_config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(Arc::new(client_config))
}

fn parse_pem_certs(pem: &str) -> crate::Result<Vec<CertificateDer<'static>>> {
    let certs = rustls_pemfile::certs(&mut pem.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .map_err(error::builder)?;
    if certs.is_empty() {
        return Err(error::builder("PEM data contains no certificates"));
    }
    Ok(certs)
}

/// Run the TLS handshake for `host` over an established TCP stream.
pub(crate) async fn connect_tls(
    tcp: TcpStream,
    host: &str,
    config: Arc<ClientConfig>,
) -> crate::Result<TlsStream<TcpStream>> {
    let server_name = match host.parse::<IpAddr>() {
        Ok(ip) => ServerName::IpAddress(ip.into()),
        Err(_) => ServerName::try_from(host.to_owned()).map_err(error::connect)?,
    };

    let connector = TlsConnector::from(config);
    let stream = connector
        .connect(server_name, tcp)
        .await
        .map_err(error::connect)?;

    tracing::debug!("TLS connection established to {host}");
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tls_config_builds() {
        let config = build_client_config(&TlsConfig::default()).expect("webpki roots");
        assert_eq!(config.alpn_protocols, vec![b"http/1.1".to_vec()]);
    }

    #[test]
    fn test_empty_trust_store_rejected() {
        let tls = TlsConfig {
            use_native_certs: false,
            use_webpki_roots: false,
            extra_root_certs_pem: Vec::new(),
        };
        assert!(build_client_config(&tls).expect_err("no roots").is_builder());
    }

    #[test]
    fn test_garbage_pem_rejected() {
        let tls = TlsConfig::default().add_root_certificate_pem("not a certificate");
        assert!(build_client_config(&tls).expect_err("bad pem").is_builder());
    }
}

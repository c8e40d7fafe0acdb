//! TLS certificate inspection.
//!
//! Connects to port 443 with SNI and full hostname verification (the
//! handshake is the point, so verification is never skipped) and reads the
//! issuer and expiry off the presented leaf certificate.
//!
//! Uses `tokio-rustls` for the connection and `x509-parser` for the
//! certificate fields.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::debug;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::{TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS};
use crate::models::TlsInfo;

/// Performs a verified handshake with `host:443` and extracts the leaf
/// certificate's issuer and not-after timestamp.
///
/// Connection, handshake, or parse failure is an error; there is no retry.
pub async fn inspect(host: &str) -> Result<TlsInfo> {
    debug!("inspecting certificate of {host}");

    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| anyhow::anyhow!("invalid server name {host}: {e}"))?;

    let sock = match tokio::time::timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        TcpStream::connect((host, 443)),
    )
    .await
    {
        Ok(Ok(sock)) => sock,
        Ok(Err(e)) => anyhow::bail!("failed to connect to {host}:443: {e}"),
        Err(_) => anyhow::bail!(
            "connection to {host}:443 timed out after {TCP_CONNECT_TIMEOUT_SECS}s"
        ),
    };

    let connector = TlsConnector::from(Arc::new(config));
    let tls_stream = match tokio::time::timeout(
        Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        connector.connect(server_name, sock),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => anyhow::bail!("TLS handshake with {host} failed: {e}"),
        Err(_) => anyhow::bail!(
            "TLS handshake with {host} timed out after {TLS_HANDSHAKE_TIMEOUT_SECS}s"
        ),
    };

    let (_, session) = tls_stream.get_ref();
    let certs = session
        .peer_certificates()
        .ok_or_else(|| anyhow::anyhow!("{host} presented no certificate"))?;
    let cert = certs
        .first()
        .ok_or_else(|| anyhow::anyhow!("{host} presented an empty certificate chain"))?;

    let (_, parsed) = x509_parser::parse_x509_certificate(cert.as_ref())
        .map_err(|e| anyhow::anyhow!("certificate of {host} did not parse: {e}"))?;
    let tbs_cert = &parsed.tbs_certificate;

    let issuer = tbs_cert.issuer.to_string();
    let valid_until = tbs_cert
        .validity
        .not_after
        .to_rfc2822()
        .map_err(|e| anyhow::anyhow!("RFC2822 conversion error for not_after: {e}"))?;

    debug!("certificate of {host}: issued by {issuer}, valid until {valid_until}");

    Ok(TlsInfo { issuer, valid_until })
}

//! WHOIS domain registration lookup.
//!
//! Speaks the plain-text WHOIS protocol (RFC 3912) over TCP port 43: one
//! query line out, the whole response back in. Thin registries answer with
//! a pointer to the registrar's server, so `refer:` and
//! `Registrar WHOIS Server:` referrals are followed for a bounded number
//! of hops before the final response is parsed.

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use tldextract::TldExtractor;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::{MAX_WHOIS_REFERRALS, WHOIS_LOOKUP_TIMEOUT_SECS, WHOIS_PORT};
use crate::models::{WhoisInfo, NOT_AVAILABLE};

/// Response keys announcing a more specific WHOIS server.
const REFERRAL_KEYS: &[&str] = &["refer", "registrar whois server"];

// Field keys in priority order; registries and registrars label the same
// facts differently, so each field carries the spellings seen in practice.
const DOMAIN_KEYS: &[&str] = &["domain name", "domain"];
const REGISTRAR_KEYS: &[&str] = &["registrar", "sponsoring registrar"];
const ORGANIZATION_KEYS: &[&str] = &[
    "registrant organization",
    "registrant organisation",
    "organization",
    "org",
];
const CREATED_KEYS: &[&str] = &["creation date", "created", "registered on"];
const EXPIRES_KEYS: &[&str] = &[
    "registry expiry date",
    "expiration date",
    "expiry date",
    "paid-till",
];

/// Looks up the registration record for `host`, starting at `server`.
///
/// The registrable domain is derived first (IP literals and suffix-less
/// hosts have no registration record and fail here, before any socket is
/// opened). `server` accepts a bare hostname or `host:port`.
pub async fn lookup(extractor: &TldExtractor, host: &str, server: &str) -> Result<WhoisInfo> {
    let domain = registrable_domain(extractor, host)?;
    lookup_domain(&domain, server).await
}

/// Queries `server` for `domain` and follows referrals to the registrar.
async fn lookup_domain(domain: &str, server: &str) -> Result<WhoisInfo> {
    debug!("querying WHOIS for {domain} starting at {server}");

    let mut current = server.to_string();
    let mut response = query_server(&current, domain).await?;

    for _ in 0..MAX_WHOIS_REFERRALS {
        let Some(next) = find_referral(&response) else {
            break;
        };
        if next.eq_ignore_ascii_case(&current) {
            break;
        }
        debug!("following WHOIS referral from {current} to {next}");
        match query_server(&next, domain).await {
            Ok(better) => {
                current = next;
                response = better;
            }
            // A dead referral is not fatal; the record in hand still stands.
            Err(e) => {
                debug!("WHOIS referral {next} failed: {e:#}");
                break;
            }
        }
    }

    Ok(parse_response(&response))
}

/// Reduces `host` to its registrable domain, e.g. `www.example.co.uk`
/// to `example.co.uk`.
fn registrable_domain(extractor: &TldExtractor, host: &str) -> Result<String> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() {
        anyhow::bail!("IP addresses have no registration record: {host}");
    }

    let parts = extractor
        .extract(host)
        .with_context(|| format!("failed to split {host} into registrable parts"))?;

    match (parts.domain, parts.suffix) {
        (Some(domain), Some(suffix)) => Ok(format!("{domain}.{suffix}")),
        _ => anyhow::bail!("{host} has no registrable domain"),
    }
}

/// One WHOIS exchange: connect, send the query line, read until EOF.
async fn query_server(server: &str, domain: &str) -> Result<String> {
    let (host, port) = server_address(server);

    let exchange = async {
        let mut stream = TcpStream::connect((host.as_str(), port))
            .await
            .with_context(|| format!("failed to connect to WHOIS server {server}"))?;
        stream
            .write_all(format!("{domain}\r\n").as_bytes())
            .await
            .with_context(|| format!("failed to send WHOIS query to {server}"))?;

        let mut raw = Vec::new();
        stream
            .read_to_end(&mut raw)
            .await
            .with_context(|| format!("failed to read WHOIS response from {server}"))?;

        Ok::<_, anyhow::Error>(String::from_utf8_lossy(&raw).into_owned())
    };

    match tokio::time::timeout(Duration::from_secs(WHOIS_LOOKUP_TIMEOUT_SECS), exchange).await {
        Ok(result) => result,
        Err(_) => anyhow::bail!(
            "WHOIS query to {server} timed out after {WHOIS_LOOKUP_TIMEOUT_SECS}s"
        ),
    }
}

/// Splits an optional `:port` suffix off a server name, defaulting to 43.
fn server_address(server: &str) -> (String, u16) {
    match server.rsplit_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(port) => (host.to_string(), port),
            Err(_) => (server.to_string(), WHOIS_PORT),
        },
        None => (server.to_string(), WHOIS_PORT),
    }
}

/// Pulls the referral target out of a response, shorn of any URL dressing.
fn find_referral(response: &str) -> Option<String> {
    let raw = field_value(response, REFERRAL_KEYS)?;
    let server = raw
        .trim_start_matches("whois://")
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    if server.is_empty() {
        None
    } else {
        Some(server.to_string())
    }
}

fn parse_response(response: &str) -> WhoisInfo {
    let field = |keys: &[&str]| {
        field_value(response, keys)
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };

    WhoisInfo {
        domain_name: field(DOMAIN_KEYS),
        registrar: field(REGISTRAR_KEYS),
        organization: field(ORGANIZATION_KEYS),
        created: field(CREATED_KEYS),
        expires: field(EXPIRES_KEYS),
    }
}

/// First non-empty `key: value` line whose key equals one of `keys`,
/// case-insensitively. Keys are tried in order, so the more specific
/// spellings win regardless of where they sit in the response.
fn field_value<'a>(response: &'a str, keys: &[&str]) -> Option<&'a str> {
    for key in keys {
        for line in response.lines() {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case(key) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tldextract::{TldExtractor, TldOption};
    use tokio::net::TcpListener;

    /// Binds a one-shot WHOIS server on the loopback that answers any
    /// query with `response`. Returns its `host:port` address.
    async fn spawn_whois_server(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut query = vec![0u8; 256];
            let n = stream.read(&mut query).await.unwrap();
            assert!(query[..n].ends_with(b"\r\n"));
            stream.write_all(response.as_bytes()).await.unwrap();
        });
        addr
    }

    #[test]
    fn parses_registry_fields_case_insensitively() {
        let response = "Domain Name: EXAMPLE.COM\r\n\
                        REGISTRAR: Example Registrar, Inc.\r\n\
                        Creation Date: 1995-08-14T04:00:00Z\r\n\
                        Registry Expiry Date: 2026-08-13T04:00:00Z\r\n";
        let info = parse_response(response);
        assert_eq!(info.domain_name, "EXAMPLE.COM");
        assert_eq!(info.registrar, "Example Registrar, Inc.");
        assert_eq!(info.organization, "N/A");
        assert_eq!(info.created, "1995-08-14T04:00:00Z");
        assert_eq!(info.expires, "2026-08-13T04:00:00Z");
    }

    #[test]
    fn absent_fields_map_to_not_available() {
        let info = parse_response("%% no match for this object\r\n");
        assert_eq!(info.domain_name, "N/A");
        assert_eq!(info.registrar, "N/A");
        assert_eq!(info.organization, "N/A");
        assert_eq!(info.created, "N/A");
        assert_eq!(info.expires, "N/A");
    }

    #[test]
    fn prefers_the_specific_organization_key() {
        let response = "org: ORG-EX1-RIPE\nRegistrant Organization: Acme Corp\n";
        assert_eq!(parse_response(response).organization, "Acme Corp");
    }

    #[test]
    fn registrar_key_does_not_match_the_referral_line() {
        let response = "Registrar WHOIS Server: whois.example-registrar.com\n";
        assert_eq!(parse_response(response).registrar, "N/A");
    }

    #[test]
    fn blank_values_fall_through_to_a_later_line() {
        let response = "Registrant Organization:\nRegistrant Organization: Acme Corp\n";
        assert_eq!(parse_response(response).organization, "Acme Corp");
    }

    #[test]
    fn referral_comes_from_either_key_without_url_dressing() {
        assert_eq!(
            find_referral("refer: whois.verisign-grs.com\n").as_deref(),
            Some("whois.verisign-grs.com")
        );
        assert_eq!(
            find_referral("Registrar WHOIS Server: http://whois.godaddy.com/\n").as_deref(),
            Some("whois.godaddy.com")
        );
        assert_eq!(find_referral("Domain Name: EXAMPLE.COM\n"), None);
    }

    #[test]
    fn server_address_splits_an_explicit_port() {
        assert_eq!(
            server_address("127.0.0.1:4343"),
            ("127.0.0.1".to_string(), 4343)
        );
        assert_eq!(
            server_address("whois.iana.org"),
            ("whois.iana.org".to_string(), WHOIS_PORT)
        );
    }

    #[test]
    fn ip_literals_are_rejected_before_any_network_use() {
        let extractor = TldExtractor::new(TldOption::default());
        let err = registrable_domain(&extractor, "192.0.2.7").unwrap_err();
        assert!(format!("{err:#}").contains("registration record"));
        let err = registrable_domain(&extractor, "[2001:db8::1]").unwrap_err();
        assert!(format!("{err:#}").contains("registration record"));
    }

    /// Needs the public suffix list, which tldextract may fetch remotely.
    #[test]
    #[ignore]
    fn e2e_extracts_the_registrable_domain() {
        let extractor = TldExtractor::new(TldOption::default());
        let domain = registrable_domain(&extractor, "www.example.co.uk").unwrap();
        assert_eq!(domain, "example.co.uk");
    }

    #[tokio::test]
    async fn reads_the_record_from_a_single_server() {
        let server = spawn_whois_server(
            "Domain Name: example.com\r\nRegistrar: Example Registrar, Inc.\r\n".to_string(),
        )
        .await;

        let info = lookup_domain("example.com", &server).await.unwrap();
        assert_eq!(info.domain_name, "example.com");
        assert_eq!(info.registrar, "Example Registrar, Inc.");
        assert_eq!(info.organization, "N/A");
    }

    #[tokio::test]
    async fn follows_a_referral_to_the_registrar_record() {
        let registrar = spawn_whois_server(
            "Domain Name: example.com\r\n\
             Registrar: Example Registrar, Inc.\r\n\
             Registrant Organization: Acme Corp\r\n\
             Creation Date: 1995-08-14\r\n\
             Registry Expiry Date: 2026-08-13\r\n"
                .to_string(),
        )
        .await;
        let registry = spawn_whois_server(format!("refer: {registrar}\r\n")).await;

        let info = lookup_domain("example.com", &registry).await.unwrap();
        assert_eq!(info.registrar, "Example Registrar, Inc.");
        assert_eq!(info.organization, "Acme Corp");
        assert_eq!(info.created, "1995-08-14");
    }

    #[tokio::test]
    async fn a_referral_back_to_the_same_server_stops_the_chain() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let response = format!("refer: {addr}\r\nRegistrar: Example Registrar, Inc.\r\n");
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut query = vec![0u8; 256];
            stream.read(&mut query).await.unwrap();
            stream.write_all(response.as_bytes()).await.unwrap();
        });

        let info = lookup_domain("example.com", &addr).await.unwrap();
        assert_eq!(info.registrar, "Example Registrar, Inc.");
    }

    #[tokio::test]
    async fn a_dead_referral_keeps_the_record_in_hand() {
        let ghost = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ghost_addr = ghost.local_addr().unwrap().to_string();
        drop(ghost);

        let server = spawn_whois_server(format!(
            "refer: {ghost_addr}\r\nRegistrar: Example Registrar, Inc.\r\n"
        ))
        .await;

        let info = lookup_domain("example.com", &server).await.unwrap();
        assert_eq!(info.registrar, "Example Registrar, Inc.");
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = lookup_domain("example.com", &addr).await.unwrap_err();
        assert!(format!("{err:#}").contains("failed to connect to WHOIS server"));
    }
}

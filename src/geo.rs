//! Host geolocation: DNS resolution plus an IP geolocation provider lookup.

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use trust_dns_resolver::TokioAsyncResolver;

use crate::config::GEO_LOOKUP_TIMEOUT_SECS;
use crate::models::{GeoInfo, NOT_AVAILABLE};

/// Provider response. Unknown addresses come back as HTTP 200 with the
/// fields simply missing, which maps to "N/A" across the board.
#[derive(Debug, Deserialize)]
struct GeoApiResponse {
    city: Option<String>,
    country: Option<String>,
    isp: Option<String>,
}

impl From<GeoApiResponse> for GeoInfo {
    fn from(response: GeoApiResponse) -> Self {
        GeoInfo {
            city: response.city.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            country: response
                .country
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            isp: response.isp.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

/// Resolves a hostname to its first address. IP literals pass through.
pub async fn resolve_host_ip(resolver: &TokioAsyncResolver, host: &str) -> Result<IpAddr> {
    let lookup = resolver
        .lookup_ip(host)
        .await
        .with_context(|| format!("DNS resolution failed for {host}"))?;
    lookup
        .iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no addresses found for {host}"))
}

/// Locates a host: resolve it, then ask the geolocation endpoint about the
/// address. Any resolution, transport, or decode error fails the probe.
pub async fn locate(
    client: &Client,
    resolver: &TokioAsyncResolver,
    host: &str,
    endpoint: &str,
) -> Result<GeoInfo> {
    let ip = resolve_host_ip(resolver, host).await?;
    debug!("resolved {host} to {ip}");

    let lookup_url = format!("{}/{ip}", endpoint.trim_end_matches('/'));
    let response = client
        .get(&lookup_url)
        .timeout(Duration::from_secs(GEO_LOOKUP_TIMEOUT_SECS))
        .send()
        .await
        .with_context(|| format!("geolocation request to {lookup_url} failed"))?
        .error_for_status()
        .context("geolocation provider answered an error status")?;

    let decoded: GeoApiResponse = response
        .json()
        .await
        .context("geolocation response was not valid JSON")?;

    Ok(decoded.into())
}

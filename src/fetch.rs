//! HTTP fetching: the main page and the host-level availability probes.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;

use crate::config::{AUX_PROBE_TIMEOUT_SECS, MAX_RESPONSE_BODY_SIZE};
use crate::models::Availability;

/// The main page as fetched: final status, latency, and body.
#[derive(Debug)]
pub struct FetchedPage {
    /// HTTP status after redirects.
    pub status: u16,
    /// Seconds from dispatch to response headers.
    pub elapsed_seconds: f64,
    /// Decoded response body.
    pub body: String,
}

/// Fetches the main page.
///
/// A single GET under the client's timeout. Any transport error or non-2xx
/// status is an error carrying the underlying cause; the caller escalates it,
/// since everything downstream needs the body. Bodies over
/// [`MAX_RESPONSE_BODY_SIZE`] fail the same way, whether announced by the
/// `Content-Length` header or discovered while the body streams in.
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage> {
    let started = Instant::now();
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url} failed"))?;
    let elapsed_seconds = started.elapsed().as_secs_f64();

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("GET {url} returned status {status}");
    }

    if let Some(length) = response.content_length() {
        if length > MAX_RESPONSE_BODY_SIZE as u64 {
            anyhow::bail!(
                "response body of {url} is {length} bytes, over the {MAX_RESPONSE_BODY_SIZE} byte limit"
            );
        }
    }

    // The declared length is advisory and chunked responses carry none,
    // so the cap is enforced again as the body arrives.
    let mut raw: Vec<u8> = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("reading body of {url} failed"))?
    {
        if raw.len() + chunk.len() > MAX_RESPONSE_BODY_SIZE {
            anyhow::bail!(
                "response body of {url} exceeds the {MAX_RESPONSE_BODY_SIZE} byte limit"
            );
        }
        raw.extend_from_slice(&chunk);
    }
    let body = String::from_utf8_lossy(&raw).into_owned();

    debug!(
        "fetched {url}: status {status}, {} bytes in {elapsed_seconds:.3}s",
        body.len()
    );

    Ok(FetchedPage {
        status: status.as_u16(),
        elapsed_seconds,
        body,
    })
}

/// Probes a host-level resource such as `/robots.txt`.
///
/// Shorter deadline than the main fetch; any failure only downgrades the
/// availability flag, it never surfaces as an error.
pub async fn probe_resource(client: &Client, url: &str) -> Availability {
    let result = client
        .get(url)
        .timeout(Duration::from_secs(AUX_PROBE_TIMEOUT_SECS))
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => Availability::Available,
        Ok(response) => {
            debug!("{url} answered status {}", response.status());
            Availability::NotFound
        }
        Err(e) => {
            debug!("probe of {url} failed: {e}");
            Availability::NotFound
        }
    }
}

//! Report data model.
//!
//! An analysis produces exactly one [`AnalysisReport`]. The intelligence
//! facets (geo, TLS, WHOIS) are each wrapped in a [`ProbeOutcome`] so a
//! consumer can branch on every facet independently; nothing in here is
//! optional in the "maybe it was never set" sense.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::target::NormalizedTarget;

/// Placeholder for fields an upstream provider omitted.
pub const NOT_AVAILABLE: &str = "N/A";

/// The result of one probe: either its value or the reason it failed.
///
/// Probes never raise; a failed probe is embedded in the report with a
/// human-readable reason and the analysis carries on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome<T> {
    /// The probe produced a value.
    Success(T),
    /// The probe failed; the string preserves the underlying cause.
    Failed(String),
}

impl<T> ProbeOutcome<T> {
    /// Converts a probe-internal `Result` into an outcome, flattening the
    /// error chain into the failure reason.
    pub fn from_result(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => ProbeOutcome::Success(value),
            Err(e) => ProbeOutcome::Failed(format!("{e:#}")),
        }
    }

    /// Returns true for the `Success` variant.
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success(_))
    }

    /// Returns the value if the probe succeeded.
    pub fn success(&self) -> Option<&T> {
        match self {
            ProbeOutcome::Success(value) => Some(value),
            ProbeOutcome::Failed(_) => None,
        }
    }

    /// Returns the failure reason if the probe failed.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Success(_) => None,
            ProbeOutcome::Failed(reason) => Some(reason),
        }
    }
}

/// Whether a host-level resource (robots.txt, sitemap.xml) answered 2xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// The resource answered with a success status.
    Available,
    /// The resource was missing or the probe failed.
    NotFound,
}

impl Availability {
    /// The label rendered in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "Available",
            Availability::NotFound => "Not found",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Links discovered in the page, split by host.
///
/// Both lists keep document order and repeated occurrences; the counts mirror
/// how often a link appears, not how many distinct links exist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkSet {
    /// Links on the target's own host.
    pub internal: Vec<String>,
    /// Links pointing at other hosts.
    pub external: Vec<String>,
}

/// Everything derived from the fetched page itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    /// Page title, or the documented default when absent or empty.
    pub title: String,
    /// Meta description, or the documented default.
    pub description: String,
    /// Favicon href, or the documented default.
    pub favicon: String,
    /// Author/organization, resolved through the fallback chain
    /// (author meta, og:site_name, WHOIS organization, "Unknown").
    pub creator: String,
    /// Number of `<img>` elements with a non-empty `src`.
    pub image_count: usize,
    /// Number of word-character runs in the document text.
    pub word_count: usize,
    /// Discovered links, classified against the target host.
    pub links: LinkSet,
    /// Whether `/robots.txt` answered 2xx.
    pub robots: Availability,
    /// Whether `/sitemap.xml` answered 2xx.
    pub sitemap: Availability,
}

/// Geolocation of the resolved host address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoInfo {
    /// City reported by the provider, or [`NOT_AVAILABLE`].
    pub city: String,
    /// Country reported by the provider, or [`NOT_AVAILABLE`].
    pub country: String,
    /// ISP reported by the provider, or [`NOT_AVAILABLE`].
    pub isp: String,
}

/// Certificate facts as presented during the TLS handshake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TlsInfo {
    /// Issuer distinguished name of the leaf certificate.
    pub issuer: String,
    /// Not-after timestamp of the leaf certificate, RFC 2822 formatted.
    pub valid_until: String,
}

/// Domain registration facts, verbatim from the registry record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhoisInfo {
    /// Registered domain name, or [`NOT_AVAILABLE`].
    pub domain_name: String,
    /// Sponsoring registrar, or [`NOT_AVAILABLE`].
    pub registrar: String,
    /// Registrant organization, or [`NOT_AVAILABLE`].
    pub organization: String,
    /// Creation date as the registry prints it, or [`NOT_AVAILABLE`].
    pub created: String,
    /// Expiry date as the registry prints it, or [`NOT_AVAILABLE`].
    pub expires: String,
}

/// The complete result of one analysis invocation.
///
/// Constructed once by the aggregator and immutable afterwards. Only
/// `target`, `timestamp`, `status` and `elapsed_seconds` are guaranteed
/// success-shaped; each intelligence facet must be checked on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// The normalized analysis target.
    pub target: NormalizedTarget,
    /// When the page was captured.
    pub timestamp: DateTime<Utc>,
    /// HTTP status of the main page (after redirects).
    pub status: u16,
    /// Seconds from request dispatch to response headers.
    pub elapsed_seconds: f64,
    /// Everything parsed out of the page body.
    pub page: PageSummary,
    /// Host geolocation outcome.
    pub geo: ProbeOutcome<GeoInfo>,
    /// TLS certificate outcome.
    pub tls: ProbeOutcome<TlsInfo>,
    /// Domain registration outcome.
    pub whois: ProbeOutcome<WhoisInfo>,
}

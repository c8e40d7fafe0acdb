//! site_report library: single-site analysis pipeline
//!
//! This library analyzes one web site identified by a URL and produces a
//! structured [`AnalysisReport`] combining HTTP response metadata, parsed
//! page content (title, description, favicon, links, images, word count),
//! host geolocation, TLS certificate details, WHOIS registration data, and
//! the availability of `robots.txt`/`sitemap.xml`.
//!
//! Only two failures abort an analysis: input that never names a host
//! ([`AnalysisError::InvalidInput`]) and a main page that cannot be fetched
//! ([`AnalysisError::Unreachable`]). Every other probe failure is embedded
//! in the report as a [`ProbeOutcome::Failed`] value, so a consumer can
//! branch on each facet independently.
//!
//! # Example
//!
//! ```no_run
//! use site_report::run_analysis;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = run_analysis("example.com").await?;
//! println!(
//!     "{} answered {} in {:.3}s ({} words, {} images)",
//!     report.target.as_str(),
//!     report.status,
//!     report.elapsed_seconds,
//!     report.page.word_count,
//!     report.page.image_count,
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

pub mod config;
mod error_handling;
mod fetch;
mod geo;
mod html;
pub mod initialization;
mod links;
mod models;
mod target;
mod tls;
mod whois;

// Re-export public API
pub use config::{AnalyzerConfig, LogFormat, LogLevel, Opt, OutputFormat};
pub use error_handling::{AnalysisError, InitializationError};
pub use models::{
    AnalysisReport, Availability, GeoInfo, LinkSet, PageSummary, ProbeOutcome, TlsInfo, WhoisInfo,
};
pub use run::{run_analysis, Analyzer};
pub use target::{normalize, NormalizedTarget, Scheme};

// Internal run module (contains the aggregation logic)
mod run {
    use std::future::Future;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use log::{debug, info, warn};
    use reqwest::Client;
    use tldextract::TldExtractor;
    use tokio::time::timeout;
    use trust_dns_resolver::TokioAsyncResolver;

    use crate::config::{
        AnalyzerConfig, GEO_LOOKUP_TIMEOUT_SECS, WHOIS_LOOKUP_TIMEOUT_SECS,
    };
    use crate::error_handling::{AnalysisError, InitializationError};
    use crate::fetch::{fetch_page, probe_resource};
    use crate::html::{summarize_page, UNKNOWN_CREATOR};
    use crate::initialization::{init_client, init_crypto_provider, init_extractor, init_resolver};
    use crate::links::classify_links;
    use crate::models::{
        AnalysisReport, GeoInfo, PageSummary, ProbeOutcome, TlsInfo, WhoisInfo, NOT_AVAILABLE,
    };
    use crate::target::{normalize, NormalizedTarget};

    /// The analysis pipeline with its shared network resources.
    ///
    /// Holds the HTTP client, DNS resolver, and public suffix extractor so
    /// repeated analyses reuse connection pools and caches. Every handle is
    /// immutable; one `Analyzer` can serve any number of concurrent
    /// [`run`](Analyzer::run) calls, and no state leaks between them.
    pub struct Analyzer {
        config: AnalyzerConfig,
        client: Client,
        resolver: Arc<TokioAsyncResolver>,
        extractor: Arc<TldExtractor>,
    }

    impl Analyzer {
        /// Builds an analyzer from the given configuration.
        ///
        /// # Errors
        ///
        /// Returns an error if the HTTP client cannot be constructed.
        pub fn new(config: AnalyzerConfig) -> Result<Self, InitializationError> {
            init_crypto_provider();
            let client = init_client(&config.user_agent, config.timeout_seconds)?;
            Ok(Self {
                config,
                client,
                resolver: init_resolver(),
                extractor: init_extractor(),
            })
        }

        /// Analyzes one site and assembles its report.
        ///
        /// Normalizes the input (no network on failure), fetches the main
        /// page (the only probe whose failure aborts), parses the body, then
        /// fans out the robots/sitemap availability probes and the three
        /// host intelligence probes concurrently. Once the main fetch has
        /// succeeded this cannot fail; degraded probes are embedded in the
        /// report as [`ProbeOutcome::Failed`] values.
        ///
        /// Dropping the returned future cancels every in-flight probe.
        ///
        /// # Errors
        ///
        /// [`AnalysisError::InvalidInput`] when the input cannot be turned
        /// into a target, [`AnalysisError::Unreachable`] when the main page
        /// fetch fails.
        pub async fn run(&self, raw: &str) -> Result<AnalysisReport, AnalysisError> {
            let target = normalize(raw)?;
            info!("analyzing {}", target.as_str());

            let fetched = fetch_page(&self.client, target.as_str())
                .await
                .map_err(|e| AnalysisError::Unreachable(format!("{e:#}")))?;
            let timestamp = Utc::now();

            // The parsed document is not Send, so all body work happens
            // here, before the probe fan-out.
            let extract = summarize_page(&fetched.body);
            let links = classify_links(&fetched.body, &target);
            debug!(
                "parsed {}: {} internal / {} external links, {} words, {} images",
                target.host(),
                links.internal.len(),
                links.external.len(),
                extract.word_count,
                extract.image_count,
            );

            // The URLs must outlive the joined futures that borrow them.
            let robots_url = target.resource_url("/robots.txt");
            let sitemap_url = target.resource_url("/sitemap.xml");
            let (robots, sitemap, geo, tls, whois) = tokio::join!(
                probe_resource(&self.client, &robots_url),
                probe_resource(&self.client, &sitemap_url),
                self.geo_probe(&target),
                self.tls_probe(&target),
                self.whois_probe(&target),
            );

            let creator = resolve_creator(extract.creator, &whois);

            info!(
                "analysis of {} complete: status {}, {:.3}s",
                target.as_str(),
                fetched.status,
                fetched.elapsed_seconds,
            );

            Ok(AnalysisReport {
                target,
                timestamp,
                status: fetched.status,
                elapsed_seconds: fetched.elapsed_seconds,
                page: PageSummary {
                    title: extract.title,
                    description: extract.description,
                    favicon: extract.favicon,
                    creator,
                    image_count: extract.image_count,
                    word_count: extract.word_count,
                    links,
                    robots,
                    sitemap,
                },
                geo,
                tls,
                whois,
            })
        }

        async fn geo_probe(&self, target: &NormalizedTarget) -> ProbeOutcome<GeoInfo> {
            let lookup = crate::geo::locate(
                &self.client,
                &self.resolver,
                target.host(),
                &self.config.geo_endpoint,
            );
            let outcome = bounded(GEO_LOOKUP_TIMEOUT_SECS, lookup).await;
            if let Some(reason) = outcome.failure_reason() {
                warn!("geolocation of {} failed: {reason}", target.host());
            }
            outcome
        }

        async fn tls_probe(&self, target: &NormalizedTarget) -> ProbeOutcome<TlsInfo> {
            if !target.scheme().is_secure() {
                debug!("skipping certificate inspection of {}", target.host());
                return ProbeOutcome::Failed("target does not use https".to_string());
            }
            // No outer deadline; the connect and handshake steps carry
            // their own.
            let outcome = ProbeOutcome::from_result(crate::tls::inspect(target.host()).await);
            if let Some(reason) = outcome.failure_reason() {
                warn!("certificate inspection of {} failed: {reason}", target.host());
            }
            outcome
        }

        async fn whois_probe(&self, target: &NormalizedTarget) -> ProbeOutcome<WhoisInfo> {
            let lookup = crate::whois::lookup(
                &self.extractor,
                target.host(),
                &self.config.whois_server,
            );
            let outcome = bounded(WHOIS_LOOKUP_TIMEOUT_SECS, lookup).await;
            if let Some(reason) = outcome.failure_reason() {
                warn!("WHOIS lookup of {} failed: {reason}", target.host());
            }
            outcome
        }
    }

    /// Applies the probe deadline shared by the geolocation and WHOIS
    /// probes: the lookup's own outcome if it finishes in time, otherwise
    /// a failure naming the deadline. The lookup is dropped on expiry,
    /// cancelling whatever stage it was in.
    async fn bounded<T>(
        deadline_seconds: u64,
        lookup: impl Future<Output = anyhow::Result<T>>,
    ) -> ProbeOutcome<T> {
        match timeout(Duration::from_secs(deadline_seconds), lookup).await {
            Ok(result) => ProbeOutcome::from_result(result),
            Err(_) => ProbeOutcome::Failed(format!("timeout after {deadline_seconds}s")),
        }
    }

    /// Applies the WHOIS organization backfill to the page creator.
    ///
    /// The creator stays as extracted unless it is still the unknown
    /// default and the WHOIS probe produced a real organization.
    fn resolve_creator(extracted: String, whois: &ProbeOutcome<WhoisInfo>) -> String {
        if extracted != UNKNOWN_CREATOR {
            return extracted;
        }
        match whois.success() {
            Some(info) if !info.organization.is_empty() && info.organization != NOT_AVAILABLE => {
                debug!("creator backfilled from WHOIS organization: {}", info.organization);
                info.organization.clone()
            }
            _ => extracted,
        }
    }

    /// Runs a single analysis with the default configuration.
    ///
    /// Convenience over [`Analyzer::new`] + [`Analyzer::run`] for one-shot
    /// callers. The input is validated before any resource construction, so
    /// empty or malformed addresses never cost more than a parse; a failed
    /// HTTP client construction is reported as
    /// [`AnalysisError::Unreachable`].
    ///
    /// # Errors
    ///
    /// See [`Analyzer::run`].
    pub async fn run_analysis(raw: &str) -> Result<AnalysisReport, AnalysisError> {
        normalize(raw)?;
        let analyzer = Analyzer::new(AnalyzerConfig::default())
            .map_err(|e| AnalysisError::Unreachable(e.to_string()))?;
        analyzer.run(raw).await
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn whois_with_organization(organization: &str) -> ProbeOutcome<WhoisInfo> {
            ProbeOutcome::Success(WhoisInfo {
                domain_name: "example.com".to_string(),
                registrar: "Example Registrar, Inc.".to_string(),
                organization: organization.to_string(),
                created: "1995-08-14".to_string(),
                expires: "2026-08-13".to_string(),
            })
        }

        #[test]
        fn unknown_creator_is_backfilled_from_whois() {
            let creator = resolve_creator(
                UNKNOWN_CREATOR.to_string(),
                &whois_with_organization("Acme Corp"),
            );
            assert_eq!(creator, "Acme Corp");
        }

        #[test]
        fn extracted_creator_is_never_overwritten() {
            let creator =
                resolve_creator("Jane Doe".to_string(), &whois_with_organization("Acme Corp"));
            assert_eq!(creator, "Jane Doe");
        }

        #[test]
        fn placeholder_organization_does_not_backfill() {
            let creator = resolve_creator(
                UNKNOWN_CREATOR.to_string(),
                &whois_with_organization(NOT_AVAILABLE),
            );
            assert_eq!(creator, UNKNOWN_CREATOR);

            let creator =
                resolve_creator(UNKNOWN_CREATOR.to_string(), &whois_with_organization(""));
            assert_eq!(creator, UNKNOWN_CREATOR);
        }

        #[test]
        fn failed_whois_leaves_the_unknown_creator() {
            let creator = resolve_creator(
                UNKNOWN_CREATOR.to_string(),
                &ProbeOutcome::Failed("timeout after 5s".to_string()),
            );
            assert_eq!(creator, UNKNOWN_CREATOR);
        }

        #[tokio::test]
        async fn stalled_lookup_becomes_the_timeout_outcome() {
            // A lookup that never completes, like a probe stuck on an
            // unresponsive server past its own per-stage deadlines.
            let outcome: ProbeOutcome<GeoInfo> = bounded(1, std::future::pending()).await;
            assert_eq!(outcome.failure_reason(), Some("timeout after 1s"));
        }

        #[tokio::test]
        async fn prompt_lookup_passes_through_the_deadline() {
            let outcome = bounded(5, async { Ok::<_, anyhow::Error>(7u32) }).await;
            assert_eq!(outcome.success(), Some(&7));

            let outcome: ProbeOutcome<u32> =
                bounded(5, async { Err(anyhow::anyhow!("provider said no")) }).await;
            assert_eq!(outcome.failure_reason(), Some("provider said no"));
        }
    }
}

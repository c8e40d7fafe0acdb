//! Shared resource construction: logger, HTTP client, DNS resolver, TLD
//! extractor, and the TLS crypto provider.
//!
//! Everything here is built once per [`Analyzer`](crate::Analyzer) (or once
//! per process for the logger and crypto provider) and shared immutably
//! across invocations.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use log::LevelFilter;
use reqwest::ClientBuilder;
use rustls::crypto::{ring::default_provider, CryptoProvider};
use tldextract::{TldExtractor, TldOption};
use trust_dns_resolver::TokioAsyncResolver;

use crate::config::{LogFormat, DNS_TIMEOUT_SECS, MAX_REDIRECT_HOPS};
use crate::error_handling::InitializationError;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting. The logger reads from the
/// `RUST_LOG` environment variable first; the provided `level` overrides it,
/// so `RUST_LOG=debug` works for quick digging while `--log-level` stays
/// authoritative. Chatty dependencies are pinned to quieter levels.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("selectors", LevelFilter::Warn);
    // trust-dns logs malformed-response warnings it already handles itself
    builder.filter_module("trust_dns_proto", LevelFilter::Error);
    builder.filter_module("trust_dns_resolver", LevelFilter::Warn);
    builder.filter_module("site_report", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                let emoji = match level {
                    log::Level::Error => "❌",
                    log::Level::Warn => "⚠️",
                    log::Level::Info => "✔️",
                    log::Level::Debug => "🔍",
                    log::Level::Trace => "🔬",
                };

                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    emoji,
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init() so tests that initialize repeatedly don't panic
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// Builds the shared HTTP client.
///
/// One client serves the main page fetch and every auxiliary probe; the
/// auxiliary probes shorten the deadline per request. Redirects are followed
/// up to [`MAX_REDIRECT_HOPS`].
pub fn init_client(
    user_agent: &str,
    timeout_seconds: u64,
) -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECT_HOPS))
        .build()?;
    Ok(client)
}

/// Initializes the DNS resolver for hostname lookups.
///
/// Default upstream configuration with tight timeouts so a dead resolver
/// fails the geolocation probe quickly instead of stalling it.
pub fn init_resolver() -> Arc<TokioAsyncResolver> {
    use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};

    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
    opts.attempts = 2;
    // No search domain appending; targets are always absolute names
    opts.ndots = 0;

    Arc::new(TokioAsyncResolver::tokio(ResolverConfig::default(), opts))
}

/// Initializes the public suffix extractor used to find registrable domains.
pub fn init_extractor() -> Arc<TldExtractor> {
    Arc::new(TldExtractor::new(TldOption::default()))
}

/// Initializes the crypto provider for TLS operations.
///
/// Must run before any TLS connection is established.
pub fn init_crypto_provider() {
    // The return value is ignored because reinstalling the provider is harmless
    let _ = CryptoProvider::install_default(default_provider());
}

//! Configuration: tunable constants, the library config, and CLI options.

use clap::{Parser, ValueEnum};

// constants (used as defaults)

/// Maximum accepted input length. Longer addresses are rejected before any
/// network I/O. Matches common browser and server URL limits.
pub const MAX_URL_LENGTH: usize = 2048;

/// Main page fetch timeout in seconds.
pub const MAIN_FETCH_TIMEOUT_SECS: u64 = 10;

/// Timeout in seconds for the robots.txt/sitemap.xml availability probes.
pub const AUX_PROBE_TIMEOUT_SECS: u64 = 5;

/// Overall geolocation probe timeout in seconds (DNS plus provider lookup).
pub const GEO_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Overall WHOIS probe timeout in seconds (all referral hops included).
pub const WHOIS_LOOKUP_TIMEOUT_SECS: u64 = 5;

// Network operation timeouts
/// DNS query timeout in seconds. Most queries finish well under a second;
/// failing fast here keeps the geolocation probe inside its own deadline.
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// TCP connection timeout in seconds.
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds.
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;

/// Default User-Agent string for HTTP requests.
///
/// Some servers vary behavior for, or outright block, default HTTP client
/// identifiers; a desktop browser string keeps responses representative.
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Maximum response body size in bytes (2MB). Checked against the declared
/// `Content-Length` before the read and enforced again while the body
/// streams in, so undeclared and chunked bodies stay bounded too.
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

// Redirect handling
/// Maximum number of redirect hops to follow for the main page.
pub const MAX_REDIRECT_HOPS: usize = 10;

// WHOIS protocol
/// Default WHOIS server queried first; it refers to the registry for
/// whatever TLD the target belongs to.
pub const DEFAULT_WHOIS_SERVER: &str = "whois.iana.org";
/// WHOIS protocol port.
pub const WHOIS_PORT: u16 = 43;
/// Maximum referral hops to follow after the first WHOIS response
/// (registry, then sponsoring registrar).
pub const MAX_WHOIS_REFERRALS: usize = 2;

/// Default IP geolocation endpoint. The resolved address is appended as a
/// path segment; the free tier answers over plain HTTP only.
pub const DEFAULT_GEO_ENDPOINT: &str = "http://ip-api.com/json";

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Report output format for the CLI.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// The three-section text report (default)
    Text,
    /// The full report as pretty-printed JSON
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Construct it programmatically or via [`Opt::analyzer_config`]. The two
/// endpoint fields exist so hermetic setups (tests, air-gapped runs) can
/// point the probes at their own services.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Main page fetch timeout in seconds.
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value.
    pub user_agent: String,

    /// IP geolocation endpoint; the address is appended as a path segment.
    pub geo_endpoint: String,

    /// First WHOIS server to query, as `host` or `host:port`.
    pub whois_server: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: MAIN_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geo_endpoint: DEFAULT_GEO_ENDPOINT.to_string(),
            whois_server: DEFAULT_WHOIS_SERVER.to_string(),
        }
    }
}

/// Command-line options for the `site_report` binary.
#[derive(Debug, Parser)]
#[command(
    name = "site_report",
    version,
    about = "Analyzes a web site: page content, geolocation, TLS certificate, WHOIS registration, robots.txt/sitemap.xml."
)]
pub struct Opt {
    /// Address of the site to analyze; https:// is assumed when no scheme is given
    pub url: String,

    /// Main page fetch timeout in seconds
    #[arg(long, default_value_t = MAIN_FETCH_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// IP geolocation endpoint (the resolved address is appended)
    #[arg(long, default_value = DEFAULT_GEO_ENDPOINT)]
    pub geo_endpoint: String,

    /// First WHOIS server to query, as host or host:port
    #[arg(long, default_value = DEFAULT_WHOIS_SERVER)]
    pub whois_server: String,

    /// Report output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,
}

impl Opt {
    /// Builds the library configuration from the parsed flags.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            timeout_seconds: self.timeout_seconds,
            user_agent: self.user_agent.clone(),
            geo_endpoint: self.geo_endpoint.clone(),
            whois_server: self.whois_server.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn log_level_converts_to_level_filter() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn analyzer_config_defaults_match_constants() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.timeout_seconds, MAIN_FETCH_TIMEOUT_SECS);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.geo_endpoint, DEFAULT_GEO_ENDPOINT);
        assert_eq!(config.whois_server, DEFAULT_WHOIS_SERVER);
    }

    #[test]
    fn cli_definition_is_consistent() {
        Opt::command().debug_assert();
    }

    #[test]
    fn cli_flags_flow_into_analyzer_config() {
        let opt = Opt::parse_from([
            "site_report",
            "example.com",
            "--timeout-seconds",
            "3",
            "--whois-server",
            "127.0.0.1:4343",
        ]);
        let config = opt.analyzer_config();
        assert_eq!(opt.url, "example.com");
        assert_eq!(config.timeout_seconds, 3);
        assert_eq!(config.whois_server, "127.0.0.1:4343");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }
}

//! Input normalization into a fetchable target.

use std::fmt;

use log::warn;
use serde::Serialize;
use url::Url;

use crate::config::MAX_URL_LENGTH;
use crate::error_handling::AnalysisError;

/// URL scheme of a normalized target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// Scheme name as found in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// True for `https`.
    pub fn is_secure(&self) -> bool {
        matches!(self, Scheme::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user address canonicalized into something fetchable.
///
/// `url` is the normalized input string itself, not a re-serialization; link
/// classification builds on it verbatim. `origin` addresses host-level
/// resources and keeps any explicit port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedTarget {
    scheme: Scheme,
    host: String,
    url: String,
    origin: String,
}

impl NormalizedTarget {
    /// The target's scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The target's hostname, lowercased by the URL parser.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The absolute URL string the analysis runs against.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// A URL for a host-level resource, e.g. `resource_url("/robots.txt")`.
    pub fn resource_url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }
}

/// Canonicalizes user input into a [`NormalizedTarget`].
///
/// Trims the input, assumes `https://` when no scheme is given, and parses
/// the result. Fails with [`AnalysisError::InvalidInput`] when the input is
/// empty, overlong, unparseable, of an unsupported scheme, or hostless.
/// No side effects beyond a log line on rejection.
pub fn normalize(raw: &str) -> Result<NormalizedTarget, AnalysisError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::InvalidInput("address is empty".to_string()));
    }
    if trimmed.len() > MAX_URL_LENGTH {
        warn!(
            "rejecting address exceeding maximum length ({} > {})",
            trimmed.len(),
            MAX_URL_LENGTH
        );
        return Err(AnalysisError::InvalidInput(format!(
            "address exceeds {MAX_URL_LENGTH} characters"
        )));
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate).map_err(|e| {
        warn!("rejecting unparseable address {trimmed}: {e}");
        AnalysisError::InvalidInput(format!("cannot parse {trimmed}: {e}"))
    })?;

    let scheme = match parsed.scheme() {
        "http" => Scheme::Http,
        "https" => Scheme::Https,
        other => {
            warn!("rejecting unsupported scheme {other} for {trimmed}");
            return Err(AnalysisError::InvalidInput(format!(
                "unsupported scheme {other}"
            )));
        }
    };

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            warn!("rejecting hostless address {trimmed}");
            AnalysisError::InvalidInput(format!("no hostname in {trimmed}"))
        })?;

    Ok(NormalizedTarget {
        scheme,
        host,
        url: candidate,
        origin: parsed.origin().ascii_serialization(),
    })
}

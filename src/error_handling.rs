//! Error type definitions.
//!
//! Only two conditions abort an analysis: input that never names a host, and
//! a main page that cannot be fetched. Every other failure is absorbed into
//! the report as a [`ProbeOutcome::Failed`](crate::ProbeOutcome) value.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Errors that abort a whole analysis.
///
/// Anything beyond these two cases degrades to a per-probe failure embedded
/// in the report instead of being returned as an error.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The input was empty or could not be parsed into a host.
    /// Returned before any network I/O happens.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The main page fetch failed (DNS, connection, TLS, non-2xx status, or
    /// timeout). Every downstream step depends on the page body, so this
    /// aborts the analysis.
    #[error("target unreachable: {0}")]
    Unreachable(String),
}

/// Errors raised while constructing shared resources.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

//! Error types for essstat.
//!
//! Every stage of the extraction pipeline reports failure through
//! [`EssStatError`]. Core errors are terminal for the snapshot being decoded:
//! the first one encountered is returned and nothing is rendered.

use thiserror::Error;

/// Custom error type for essstat operations.
///
/// The first block of variants comes from decoding a switch page; the second
/// from the collaborators around it (files, HTTP, JSON).
#[derive(Debug, Error)]
pub enum EssStatError {
    /// The page has no `<script>` element to decide a layout from.
    #[error("unrecognized page layout: no script elements found")]
    LayoutUnrecognized,

    /// A required embedded variable or field group is missing.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// The embedded arrays do not follow the expected packing.
    #[error("malformed field blob: {0}")]
    MalformedFieldBlob(String),

    /// A state or link code outside its enumerated domain.
    #[error("unknown {field} code: {raw:?}")]
    UnknownEnumCode { field: &'static str, raw: String },

    /// A packet counter that is not a non-negative integer.
    #[error("invalid counter {field} on port {port}")]
    InvalidCounter { port: usize, field: &'static str },

    /// Point query for a port outside `1..=max_port_num`.
    #[error("invalid port {port}: switch has ports 1..={max_port_num}")]
    InvalidPort { port: usize, max_port_num: usize },

    /// Point query for a metric name that is not a port field.
    #[error("invalid metric {0:?}")]
    InvalidMetric(String),

    /// Error reading a saved page from disk.
    /// The `#[from]` attribute allows automatic conversion from `std::io::Error`.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error encoding JSON output.
    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Error making HTTP requests (connect, timeout, body read).
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Error with HTTP headers (e.g., a target that is not a valid host).
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The switch answered a page request with something other than 200.
    #[error("login failure - bad credential? (HTTP {0})")]
    LoginRejected(reqwest::StatusCode),
}

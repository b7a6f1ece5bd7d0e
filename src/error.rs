//! Error types for sbir-topics
//!
//! This module provides error handling for the library, including:
//! - Upstream gateway failures (timeout, unreachable, non-2xx status)
//! - Resolution and aggregation failures for batch downloads
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for sbir-topics operations
pub type Result<T> = std::result::Result<T, Error>;

/// Number of upstream response body characters kept for diagnostics
pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 200;

/// Main error type for sbir-topics
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "SBIR_SEARCH_URL")
        key: Option<String>,
    },

    /// Request failed validation before reaching the upstream
    #[error("validation error: {0}")]
    Validation(String),

    /// Upstream catalog call failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Upstream answered 2xx but the body did not match the expected schema
    #[error("invalid upstream payload from {url}: {reason}")]
    InvalidPayload {
        /// The URL whose response could not be decoded
        url: String,
        /// Decoder message
        reason: String,
    },

    /// None of the requested topic codes could be resolved to an upstream id
    #[error("none of the requested topic codes were found with the given search parameters: {}", codes.join(", "))]
    TopicsNotFound {
        /// The codes that were requested and not found
        codes: Vec<String>,
    },

    /// Nothing was left to download after resolution
    #[error("no valid topics found for download")]
    NoTopicsForDownload,

    /// Every document fetch in a multi-topic batch failed
    #[error("all {failed} selected PDF downloads failed")]
    AllDownloadsFailed {
        /// Number of failed items
        failed: usize,
        /// Whether every failure originated from the upstream gateway
        all_upstream: bool,
    },

    /// Writing the ZIP archive failed
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Upstream gateway failures
///
/// All three kinds share one classification so callers can forward the
/// upstream status code when there is one and fall back to 502 otherwise.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Connect or read timeout
    #[error("request to {url} timed out")]
    Timeout {
        /// The URL that timed out
        url: String,
    },

    /// Transport-level failure (DNS, connection refused/reset, TLS)
    #[error("network error requesting {url}: {reason}")]
    Unreachable {
        /// The URL that could not be reached
        url: String,
        /// Transport error message
        reason: String,
    },

    /// Upstream responded with a non-2xx status
    #[error("upstream request to {url} failed with status {status}. Response: {body}")]
    Status {
        /// The URL that returned the error status
        url: String,
        /// HTTP status returned by the upstream
        status: u16,
        /// Leading part of the response body
        body: String,
    },
}

impl GatewayError {
    /// Classify a reqwest error raised while sending a request or reading its body
    pub fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout {
                url: url.to_string(),
            }
        } else {
            GatewayError::Unreachable {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Build a status error, keeping only the first
    /// [`UPSTREAM_BODY_PREVIEW_CHARS`] characters of the body
    pub fn status(url: &str, status: u16, body: &str) -> Self {
        let mut preview: String = body.chars().take(UPSTREAM_BODY_PREVIEW_CHARS).collect();
        if body.chars().nth(UPSTREAM_BODY_PREVIEW_CHARS).is_some() {
            preview.push_str("...");
        }
        GatewayError::Status {
            url: url.to_string(),
            status,
            body: preview,
        }
    }

    /// The upstream HTTP status, when the upstream answered at all
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            GatewayError::Timeout { .. } | GatewayError::Unreachable { .. } => None,
        }
    }

    /// Machine-readable code for this gateway failure
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Timeout { .. } => "upstream_timeout",
            GatewayError::Unreachable { .. } => "upstream_unreachable",
            GatewayError::Status { .. } => "upstream_status_error",
        }
    }
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "topic_not_found",
///     "message": "none of the requested topic codes were found with the given search parameters: A254-001",
///     "details": {
///       "codes": ["A254-001"]
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "topic_not_found", "upstream_timeout")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::Validation(_) => 400,

            // 404 Not Found
            Error::TopicsNotFound { .. } => 404,
            Error::NoTopicsForDownload => 404,

            // Upstream status is forwarded when it is a real error status
            Error::Gateway(e) => match e.upstream_status() {
                Some(status) if (400..=599).contains(&status) => status,
                _ => 502,
            },
            Error::InvalidPayload { .. } => 502,
            Error::AllDownloadsFailed {
                all_upstream: true, ..
            } => 502,
            Error::AllDownloadsFailed {
                all_upstream: false,
                ..
            } => 500,

            // 500 Internal Server Error
            Error::Config { .. } => 500,
            Error::Archive(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Gateway(e) => e.code(),
            Error::InvalidPayload { .. } => "upstream_payload_error",
            Error::TopicsNotFound { .. } => "topic_not_found",
            Error::NoTopicsForDownload => "no_topics_for_download",
            Error::AllDownloadsFailed { .. } => "all_downloads_failed",
            Error::Archive(_) => "archive_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let mut api_error = ApiError::new(error.error_code(), error.to_string());

        api_error.error.details = match &error {
            Error::Gateway(GatewayError::Status { status, url, .. }) => Some(serde_json::json!({
                "upstream_status": status,
                "url": url,
            })),
            Error::Gateway(GatewayError::Timeout { url })
            | Error::Gateway(GatewayError::Unreachable { url, .. }) => {
                Some(serde_json::json!({ "url": url }))
            }
            Error::TopicsNotFound { codes } => Some(serde_json::json!({ "codes": codes })),
            Error::AllDownloadsFailed { failed, .. } => {
                Some(serde_json::json!({ "failed": failed }))
            }
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            _ => None,
        };

        api_error
    }
}

//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`topics`] - Catalog search and topic Q&A
//! - [`downloads`] - PDF and ZIP delivery
//! - [`system`] - Health, OpenAPI, welcome

use crate::error::{Error, Result};
use crate::types::{DownloadBatchRequest, SearchQuery};
use serde::{Deserialize, Serialize};

mod downloads;
mod system;
mod topics;

// Re-export all handlers so `routes::function_name` continues to work
pub use downloads::*;
pub use system::*;
pub use topics::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Request body for POST /search
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SearchRequest {
    /// Search term to filter topics
    #[serde(default)]
    pub term: Option<String>,
    /// Page number, zero-based (default: 0)
    #[serde(default)]
    pub page: u32,
    /// Number of items per page, 1-100 (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Component filter (e.g., "USAF")
    #[serde(default)]
    pub component: Option<String>,
    /// Program year filter
    #[serde(default)]
    pub program_year: Option<i32>,
}

impl From<SearchRequest> for SearchQuery {
    fn from(request: SearchRequest) -> Self {
        SearchQuery {
            term: request.term,
            page: request.page,
            page_size: request.page_size,
            component: request.component,
            program_year: request.program_year,
        }
    }
}

/// Request body for POST /download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadRequest {
    /// Topic codes to download
    pub selected_topics: Vec<String>,
    /// Search term the topics were found with
    #[serde(default)]
    pub search_term: Option<String>,
    /// Page the topics were found on (informational, the lookup always starts at page 0)
    #[serde(default)]
    pub page: u32,
    /// Page size of the original search (informational)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Component filter of the original search
    #[serde(default)]
    pub component: Option<String>,
    /// Program year filter of the original search
    #[serde(default)]
    pub program_year: Option<i32>,
}

impl From<DownloadRequest> for DownloadBatchRequest {
    fn from(request: DownloadRequest) -> Self {
        let query = SearchQuery {
            term: request.search_term,
            page: request.page,
            page_size: request.page_size,
            component: request.component,
            program_year: request.program_year,
        };
        DownloadBatchRequest::new(request.selected_topics, query)
    }
}

/// Form fields for POST /download/form
///
/// `selected` may repeat, once per checked topic.
#[derive(Debug, Default, Serialize, utoipa::ToSchema)]
pub struct DownloadForm {
    /// Search term the topics were found with
    pub term: String,
    /// Page the topics were found on
    pub page: u32,
    /// Page size of the original search
    pub page_size: Option<u32>,
    /// Selected topic codes
    pub selected: Vec<String>,
}

impl DownloadForm {
    /// Parse an `application/x-www-form-urlencoded` body
    pub fn from_urlencoded(body: &[u8]) -> Result<Self> {
        let mut form = DownloadForm::default();

        for (key, value) in url::form_urlencoded::parse(body) {
            match &*key {
                "term" => form.term = value.into_owned(),
                "page" => form.page = parse_form_number("page", &value)?,
                "page_size" if !value.trim().is_empty() => {
                    form.page_size = Some(parse_form_number("page_size", &value)?)
                }
                "selected" => form.selected.push(value.into_owned()),
                _ => {}
            }
        }

        Ok(form)
    }
}

impl From<DownloadForm> for DownloadBatchRequest {
    fn from(form: DownloadForm) -> Self {
        let query = SearchQuery {
            term: Some(form.term),
            page: form.page,
            page_size: form.page_size.unwrap_or_else(default_page_size),
            ..SearchQuery::default()
        };
        DownloadBatchRequest::new(form.selected, query)
    }
}

/// Response for GET /
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct WelcomeResponse {
    /// Greeting with a pointer to the docs
    pub message: String,
}

fn parse_form_number(field: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Validation(format!("form field '{field}' must be a non-negative integer, got '{raw}'")))
}

fn default_page_size() -> u32 {
    10
}

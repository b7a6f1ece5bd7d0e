//! Core types for sbir-topics

use crate::error::{Error, GatewayError, Result};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filename of the multi-topic archive
pub const ARCHIVE_FILENAME: &str = "selected_pdfs.zip";

/// A solicitation topic as returned by the catalog
///
/// `topic_code` is the human-facing code shown in listings; `topic_id` is the
/// opaque upstream id needed to fetch the PDF. Everything else is carried
/// through unmodified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Human-facing topic code (e.g., "A254-001")
    pub topic_code: String,
    /// Internal upstream id used for PDF downloads
    pub topic_id: String,
    /// Topic title
    pub topic_title: String,
    /// Issuing component (ARMY, NAVY, USAF, ...)
    pub component: Option<String>,
    /// Current status (Pre-Release, Open, Closed)
    pub topic_status: Option<String>,
    /// Solicitation title
    pub solicitation_title: Option<String>,
    /// Program year
    pub program_year: Option<i32>,
    /// Release number
    pub release_number: Option<String>,
    /// Technology area
    pub technology_area: Option<String>,
    /// Keywords
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Parameters for a single catalog search
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free-text search term
    #[serde(default)]
    pub term: Option<String>,
    /// Zero-based page index (default: 0)
    #[serde(default)]
    pub page: u32,
    /// Items per page, 1-100 (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Component filter (e.g., "NAVY")
    #[serde(default)]
    pub component: Option<String>,
    /// Program year filter
    #[serde(default)]
    pub program_year: Option<i32>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            term: None,
            page: 0,
            page_size: default_page_size(),
            component: None,
            program_year: None,
        }
    }
}

impl SearchQuery {
    /// Query for a term, first page, default page size
    pub fn for_term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            ..Default::default()
        }
    }

    /// Reject out-of-range paging parameters
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(Error::Validation(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        Ok(())
    }

    /// The term as sent upstream: `None` when absent or blank
    pub fn normalized_term(&self) -> Option<&str> {
        self.term.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Same term and filters, first page, with the given page size
    pub fn widened(&self, page_size: u32) -> Self {
        Self {
            page: 0,
            page_size,
            ..self.clone()
        }
    }
}

fn default_page_size() -> u32 {
    10
}

/// Raw page returned by the gateway
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchPage {
    /// Topics on this page
    pub topics: Vec<Topic>,
    /// Total matches reported by the upstream
    pub total: u64,
}

/// One page of search results plus paging metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResult {
    /// Topics on this page
    pub topics: Vec<Topic>,
    /// Total number of matching topics
    pub total: u64,
    /// Current page (zero-based)
    pub page: u32,
    /// Page size used
    pub page_size: u32,
    /// Whether more pages follow this one
    pub has_more: bool,
    /// Number of pages at this page size
    pub total_pages: u64,
}

impl SearchResult {
    /// Attach paging metadata to a gateway page
    pub fn from_page(query: &SearchQuery, page: SearchPage) -> Self {
        let page_size = u64::from(query.page_size.max(1));
        // total never undercounts what we actually hold
        let total = page.total.max(page.topics.len() as u64);
        let has_more = (u64::from(query.page) + 1) * page_size < total;
        let total_pages = total.div_ceil(page_size).max(1);

        Self {
            topics: page.topics,
            total,
            page: query.page,
            page_size: query.page_size,
            has_more,
            total_pages,
        }
    }
}

/// A batch download: topic codes plus the search they were found with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadBatchRequest {
    /// Requested topic codes, in request order, without duplicates
    pub codes: Vec<String>,
    /// Search context the codes were discovered under
    pub query: SearchQuery,
}

impl DownloadBatchRequest {
    /// Build a request, trimming codes and dropping blanks and duplicates
    pub fn new<I, S>(codes: I, query: SearchQuery) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = std::collections::HashSet::new();
        let codes = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .filter(|c| seen.insert(c.clone()))
            .collect();
        Self { codes, query }
    }
}

/// A topic code mapped to its upstream id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTopic {
    /// Human-facing topic code
    pub code: String,
    /// Upstream topic id
    pub topic_id: String,
}

impl ResolvedTopic {
    /// Create a resolved pair
    pub fn new(code: impl Into<String>, topic_id: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            topic_id: topic_id.into(),
        }
    }
}

/// Result of resolving topic codes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Codes found in the lookup window
    pub resolved: Vec<ResolvedTopic>,
    /// Codes not found in the lookup window
    pub unresolved: Vec<String>,
}

/// Why a single document fetch failed
#[derive(Clone, Debug)]
pub enum ItemFailure {
    /// The upstream call failed
    Upstream(GatewayError),
    /// Anything else
    Unexpected(String),
}

impl From<Error> for ItemFailure {
    fn from(error: Error) -> Self {
        match error {
            Error::Gateway(e) => ItemFailure::Upstream(e),
            other => ItemFailure::Unexpected(other.to_string()),
        }
    }
}

impl std::fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemFailure::Upstream(e) => write!(f, "{e}"),
            ItemFailure::Unexpected(msg) => write!(f, "unexpected error: {msg}"),
        }
    }
}

/// Outcome of fetching one topic's document
#[derive(Clone, Debug)]
pub struct ItemOutcome {
    /// The topic that was fetched
    pub topic: ResolvedTopic,
    /// Document bytes or the failure
    pub result: std::result::Result<Vec<u8>, ItemFailure>,
}

/// What an archive entry holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveEntryKind {
    /// The topic PDF
    Document,
    /// Plain-text description of a failed fetch
    ErrorPlaceholder,
}

/// One file inside the batch archive
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct ArchiveEntry {
    /// Entry filename
    pub name: String,
    /// Topic code the entry belongs to
    pub code: String,
    /// Document or placeholder
    pub kind: ArchiveEntryKind,
}

/// Packaged result of a download
#[derive(Clone, Debug)]
pub enum DownloadOutcome {
    /// A single topic PDF
    Document {
        /// Suggested filename (`<code>.pdf`)
        filename: String,
        /// Raw PDF bytes
        bytes: Vec<u8>,
    },
    /// A ZIP archive of several topics
    Archive {
        /// Suggested filename
        filename: String,
        /// ZIP bytes
        bytes: Vec<u8>,
        /// Entries written, in order
        entries: Vec<ArchiveEntry>,
    },
}

impl DownloadOutcome {
    /// Suggested download filename
    pub fn filename(&self) -> &str {
        match self {
            DownloadOutcome::Document { filename, .. }
            | DownloadOutcome::Archive { filename, .. } => filename,
        }
    }

    /// MIME type of the payload
    pub fn content_type(&self) -> &'static str {
        match self {
            DownloadOutcome::Document { .. } => "application/pdf",
            DownloadOutcome::Archive { .. } => "application/zip",
        }
    }

    /// Payload bytes
    pub fn bytes(&self) -> &[u8] {
        match self {
            DownloadOutcome::Document { bytes, .. } | DownloadOutcome::Archive { bytes, .. } => {
                bytes
            }
        }
    }

    /// Consume into the payload bytes
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            DownloadOutcome::Document { bytes, .. } | DownloadOutcome::Archive { bytes, .. } => {
                bytes
            }
        }
    }

    /// Codes whose fetch failed and were replaced with placeholders
    pub fn failed_codes(&self) -> Vec<&str> {
        match self {
            DownloadOutcome::Document { .. } => Vec::new(),
            DownloadOutcome::Archive { entries, .. } => entries
                .iter()
                .filter(|e| e.kind == ArchiveEntryKind::ErrorPlaceholder)
                .map(|e| e.code.as_str())
                .collect(),
        }
    }
}

/// Batch download result handed to the transport layer
#[derive(Clone, Debug)]
pub struct DownloadBatchResult {
    /// The packaged payload
    pub outcome: DownloadOutcome,
    /// Requested codes that could not be resolved and were skipped
    pub unresolved: Vec<String>,
}

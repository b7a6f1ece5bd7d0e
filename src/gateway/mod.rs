//! Upstream catalog gateway
//!
//! The [`TopicGateway`] trait is the seam between the core (resolver,
//! aggregator) and the network. [`DodSbirClient`] is the reqwest-backed
//! implementation; tests substitute their own.

use crate::error::Result;
use crate::types::{SearchPage, SearchQuery};
use async_trait::async_trait;

mod client;
pub mod payload;

pub use client::{DodSbirClient, HttpClientHandle};

/// Access to the upstream search, document and questions endpoints
///
/// Implementations must be stateless with respect to individual requests so a
/// single instance can be shared across concurrent handlers.
#[async_trait]
pub trait TopicGateway: Send + Sync {
    /// Run one catalog search
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Gateway`] for timeouts, transport failures and
    /// non-2xx responses, or [`crate::Error::InvalidPayload`] when the body
    /// cannot be decoded.
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage>;

    /// Fetch the PDF for an upstream topic id, following redirects
    async fn fetch_document(&self, topic_id: &str) -> Result<Vec<u8>>;

    /// Fetch the published Q&A for an upstream topic id
    async fn fetch_questions(&self, topic_id: &str) -> Result<serde_json::Value>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

//! Core operations shared by every transport

use crate::aggregator::ArtifactAggregator;
use crate::error::{Error, Result};
use crate::gateway::TopicGateway;
use crate::resolver::TopicResolver;
use crate::types::{DownloadBatchRequest, DownloadBatchResult, SearchQuery, SearchResult};
use std::sync::Arc;
use tracing::info;

/// Search, batch download and Q&A lookup over a [`TopicGateway`]
#[derive(Clone)]
pub struct TopicService {
    gateway: Arc<dyn TopicGateway>,
    resolver: TopicResolver,
    aggregator: ArtifactAggregator,
}

impl TopicService {
    /// Create a service resolving codes over a `lookup_page_size` window
    pub fn new(gateway: Arc<dyn TopicGateway>, lookup_page_size: u32) -> Self {
        Self {
            gateway,
            resolver: TopicResolver::new(lookup_page_size),
            aggregator: ArtifactAggregator::new(),
        }
    }

    /// The gateway this service talks to
    pub fn gateway(&self) -> &dyn TopicGateway {
        self.gateway.as_ref()
    }

    /// Run one page of a catalog search
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        query.validate()?;

        let page = self.gateway.search(query).await?;
        let result = SearchResult::from_page(query, page);

        info!(
            term = query.normalized_term(),
            page = result.page,
            returned = result.topics.len(),
            total = result.total,
            "catalog search complete"
        );
        Ok(result)
    }

    /// Resolve the requested codes and package their documents
    ///
    /// Codes that cannot be resolved are skipped and reported in
    /// [`DownloadBatchResult::unresolved`].
    pub async fn download_batch(&self, request: &DownloadBatchRequest) -> Result<DownloadBatchResult> {
        if request.codes.is_empty() {
            return Err(Error::Validation("no topics selected for download".into()));
        }

        let resolution = self
            .resolver
            .resolve(self.gateway.as_ref(), &request.codes, &request.query)
            .await?;

        let outcome = self
            .aggregator
            .fetch_all(self.gateway.as_ref(), &resolution.resolved)
            .await?;

        info!(
            filename = outcome.filename(),
            size = outcome.bytes().len(),
            unresolved = resolution.unresolved.len(),
            "batch download ready"
        );

        Ok(DownloadBatchResult {
            outcome,
            unresolved: resolution.unresolved,
        })
    }

    /// Published questions and answers for an upstream topic id
    pub async fn topic_questions(&self, topic_id: &str) -> Result<serde_json::Value> {
        let topic_id = topic_id.trim();
        if topic_id.is_empty() {
            return Err(Error::Validation("topic id must not be empty".into()));
        }
        self.gateway.fetch_questions(topic_id).await
    }
}

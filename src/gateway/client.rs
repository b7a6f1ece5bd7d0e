//! reqwest-backed gateway to the DoD SBIR/STTR catalog.

use super::TopicGateway;
use super::payload::{self, UpstreamSearchResponse};
use crate::config::UpstreamConfig;
use crate::error::{Error, GatewayError, Result};
use crate::types::{SearchPage, SearchQuery};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, REFERER, USER_AGENT};
use std::sync::Arc;
use tracing::{debug, info};

/// Accept header sent on every upstream call
const ACCEPT_ANY_JSON: &str = "application/json, text/plain, */*";

/// Maximum redirect hops followed for document downloads
const MAX_REDIRECTS: usize = 10;

/// Process-wide pooled HTTP client
///
/// Acquired once at startup with [`HttpClientHandle::start`] and released with
/// [`HttpClientHandle::shutdown`]. Clones share the same connection pool.
#[derive(Clone, Debug)]
pub struct HttpClientHandle {
    client: reqwest::Client,
}

impl HttpClientHandle {
    /// Build the shared client with the configured timeouts
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the TLS backend cannot be initialized.
    pub fn start(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {e}"),
                key: None,
            })?;

        info!(
            connect_timeout_secs = config.connect_timeout.as_secs_f64(),
            request_timeout_secs = config.request_timeout.as_secs_f64(),
            "upstream HTTP client started"
        );

        Ok(Self { client })
    }

    /// The underlying client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Release this handle; the pool closes once every clone is gone
    pub fn shutdown(self) {
        drop(self.client);
        info!("upstream HTTP client released");
    }
}

/// Which upstream call is being made; decides the header set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CallKind {
    Search,
    Document,
    Questions,
}

/// [`TopicGateway`] over the public catalog API
#[derive(Clone, Debug)]
pub struct DodSbirClient {
    http: HttpClientHandle,
    config: Arc<UpstreamConfig>,
}

impl DodSbirClient {
    /// Create a gateway on top of a shared client handle
    pub fn new(http: HttpClientHandle, config: Arc<UpstreamConfig>) -> Self {
        Self { http, config }
    }

    /// Issue a GET with the identity headers and classify failures
    async fn get(&self, url: &str, kind: CallKind) -> Result<reqwest::Response> {
        let mut request = self
            .http
            .client()
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(REFERER, &self.config.referer)
            .header(ACCEPT, ACCEPT_ANY_JSON);

        // only the search call declares a JSON content type
        if kind == CallKind::Search {
            request = request.header(CONTENT_TYPE, "application/json");
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(url, status = status.as_u16(), ?kind, "upstream returned error status");
            return Err(GatewayError::status(url, status.as_u16(), &body).into());
        }

        Ok(response)
    }

    async fn read_body(url: &str, response: reqwest::Response) -> Result<Vec<u8>> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::from_transport(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl TopicGateway for DodSbirClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let url = payload::search_url(&self.config.search_url, query)?;
        debug!(
            term = query.normalized_term(),
            page = query.page,
            page_size = query.page_size,
            "searching upstream catalog"
        );

        let response = self.get(&url, CallKind::Search).await?;
        let body = Self::read_body(&url, response).await?;

        let parsed: UpstreamSearchResponse =
            serde_json::from_slice(&body).map_err(|e| Error::InvalidPayload {
                url: self.config.search_url.clone(),
                reason: e.to_string(),
            })?;

        let page = parsed.into_page();
        debug!(
            returned = page.topics.len(),
            total = page.total,
            "upstream search complete"
        );
        Ok(page)
    }

    async fn fetch_document(&self, topic_id: &str) -> Result<Vec<u8>> {
        let url = self.config.document_url(topic_id);
        debug!(topic_id, "fetching topic PDF");

        let response = self.get(&url, CallKind::Document).await?;
        let bytes = Self::read_body(&url, response).await?;

        debug!(topic_id, size = bytes.len(), "topic PDF fetched");
        Ok(bytes)
    }

    async fn fetch_questions(&self, topic_id: &str) -> Result<serde_json::Value> {
        let url = self.config.questions_url(topic_id);
        debug!(topic_id, "fetching topic questions");

        let response = self.get(&url, CallKind::Questions).await?;
        let body = Self::read_body(&url, response).await?;

        serde_json::from_slice(&body).map_err(|e| Error::InvalidPayload {
            url,
            reason: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "dod-sbir"
    }
}

//! Shared test helpers: a scripted gateway and upstream config for mock servers.

use crate::config::UpstreamConfig;
use crate::error::{Error, GatewayError, Result};
use crate::gateway::TopicGateway;
use crate::types::{SearchPage, SearchQuery, Topic};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Upstream config whose endpoints all point at a mock server
pub(crate) fn upstream_config_for(base: &str) -> UpstreamConfig {
    UpstreamConfig {
        search_url: format!("{base}/search"),
        document_url_template: format!("{base}/topics/{{topic_id}}/download/PDF"),
        questions_url_template: format!("{base}/topics/{{topic_id}}/questions"),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
        ..UpstreamConfig::default()
    }
}

/// Minimal topic with the given code and id
pub(crate) fn topic(code: &str, topic_id: &str) -> Topic {
    Topic {
        topic_code: code.to_string(),
        topic_id: topic_id.to_string(),
        topic_title: format!("Title for {code}"),
        component: Some("ARMY".into()),
        topic_status: Some("Open".into()),
        solicitation_title: None,
        program_year: Some(2025),
        release_number: None,
        technology_area: None,
        keywords: vec![],
    }
}

/// Scripted gateway
///
/// Search returns the configured catalog (or error), document fetches return
/// the bytes scripted per topic id. Every call is recorded.
#[derive(Default)]
pub(crate) struct StubGateway {
    catalog: Vec<Topic>,
    total: Option<u64>,
    search_error: Option<GatewayError>,
    documents: HashMap<String, std::result::Result<Vec<u8>, GatewayError>>,
    questions: HashMap<String, serde_json::Value>,
    pub(crate) searches: Mutex<Vec<SearchQuery>>,
    pub(crate) fetched: Mutex<Vec<String>>,
}

impl StubGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a topic to the catalog
    pub(crate) fn with_topic(mut self, code: &str, topic_id: &str) -> Self {
        self.catalog.push(topic(code, topic_id));
        self
    }

    /// Override the reported total
    pub(crate) fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Make every search fail
    pub(crate) fn with_search_error(mut self, error: GatewayError) -> Self {
        self.search_error = Some(error);
        self
    }

    /// Script a successful document
    pub(crate) fn with_document(mut self, topic_id: &str, bytes: &[u8]) -> Self {
        self.documents
            .insert(topic_id.to_string(), Ok(bytes.to_vec()));
        self
    }

    /// Script a failing document
    pub(crate) fn with_failing_document(mut self, topic_id: &str, error: GatewayError) -> Self {
        self.documents.insert(topic_id.to_string(), Err(error));
        self
    }

    /// Script questions for a topic id
    pub(crate) fn with_questions(mut self, topic_id: &str, questions: serde_json::Value) -> Self {
        self.questions.insert(topic_id.to_string(), questions);
        self
    }

    pub(crate) fn search_calls(&self) -> Vec<SearchQuery> {
        self.searches.lock().unwrap().clone()
    }

    pub(crate) fn fetch_calls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl TopicGateway for StubGateway {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        self.searches.lock().unwrap().push(query.clone());
        if let Some(error) = &self.search_error {
            return Err(error.clone().into());
        }

        let start = (query.page as usize).saturating_mul(query.page_size as usize);
        let topics: Vec<Topic> = self
            .catalog
            .iter()
            .skip(start)
            .take(query.page_size as usize)
            .cloned()
            .collect();

        Ok(SearchPage {
            topics,
            total: self.total.unwrap_or(self.catalog.len() as u64),
        })
    }

    async fn fetch_document(&self, topic_id: &str) -> Result<Vec<u8>> {
        self.fetched.lock().unwrap().push(topic_id.to_string());
        match self.documents.get(topic_id) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(error)) => Err(error.clone().into()),
            None => Err(GatewayError::status(
                &format!("stub://topics/{topic_id}/download/PDF"),
                404,
                "not scripted",
            )
            .into()),
        }
    }

    async fn fetch_questions(&self, topic_id: &str) -> Result<serde_json::Value> {
        self.questions
            .get(topic_id)
            .cloned()
            .ok_or_else(|| {
                Error::Gateway(GatewayError::status(
                    &format!("stub://topics/{topic_id}/questions"),
                    404,
                    "not scripted",
                ))
            })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

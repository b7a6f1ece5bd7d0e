//! Upstream wire formats
//!
//! Outbound: the `searchParam` JSON document. Inbound: the search response,
//! decoded into a lenient schema and then validated into [`Topic`]s.

use crate::types::{SearchPage, SearchQuery, Topic};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Release-status codes for open and pre-release topics
pub const OPEN_TOPIC_RELEASE_STATUS: [u32; 2] = [591, 592];

/// Solicitation cycle the catalog is queried for
pub const OPEN_TOPICS_CYCLE: &str = "openTopics";

/// Sort order requested from the upstream
pub const SORT_BY: &str = "finalTopicCode,asc";

/// The `searchParam` document. Field order is the serialization order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParam {
    search_text: Option<String>,
    components: Vec<String>,
    program_year: Option<i32>,
    solicitation_cycle_names: Vec<&'static str>,
    release_numbers: Vec<String>,
    topic_release_status: Vec<u32>,
    modernization_priorities: Vec<String>,
    sort_by: &'static str,
    technology_area_ids: Vec<String>,
    component: Option<String>,
    program: Option<String>,
}

impl SearchParam {
    /// Build the upstream document for a query
    pub fn from_query(query: &SearchQuery) -> Self {
        Self {
            search_text: query.normalized_term().map(String::from),
            components: query.component.iter().cloned().collect(),
            program_year: query.program_year,
            solicitation_cycle_names: vec![OPEN_TOPICS_CYCLE],
            release_numbers: Vec::new(),
            topic_release_status: OPEN_TOPIC_RELEASE_STATUS.to_vec(),
            modernization_priorities: Vec::new(),
            sort_by: SORT_BY,
            technology_area_ids: Vec::new(),
            component: None,
            program: None,
        }
    }

    /// JSON then percent-encoded, ready for the query string
    pub fn encode(&self) -> serde_json::Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(urlencoding::encode(&json).into_owned())
    }
}

/// Full search URL for a query
pub fn search_url(base: &str, query: &SearchQuery) -> serde_json::Result<String> {
    let encoded = SearchParam::from_query(query).encode()?;
    Ok(format!(
        "{base}?searchParam={encoded}&size={}&page={}",
        query.page_size, query.page
    ))
}

/// Search response body
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamSearchResponse {
    /// Topics on this page
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<UpstreamTopic>,
    /// Total matches
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
}

impl UpstreamSearchResponse {
    /// Validate every topic, dropping the ones without a code or id
    pub fn into_page(self) -> SearchPage {
        let topics = self
            .data
            .into_iter()
            .filter_map(|raw| match Topic::try_from(raw) {
                Ok(topic) => Some(topic),
                Err(reason) => {
                    warn!(reason, "dropping upstream topic");
                    None
                }
            })
            .collect();

        SearchPage {
            topics,
            total: self.total,
        }
    }
}

/// A topic as the upstream sends it
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamTopic {
    #[serde(default)]
    topic_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    topic_id: Option<String>,
    #[serde(default)]
    topic_title: Option<String>,
    #[serde(default)]
    component: Option<String>,
    #[serde(default)]
    topic_status: Option<String>,
    #[serde(default)]
    solicitation_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_i32")]
    program_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_string")]
    release_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    technology_area: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    keywords: Vec<String>,
}

impl TryFrom<UpstreamTopic> for Topic {
    type Error = &'static str;

    fn try_from(raw: UpstreamTopic) -> Result<Self, Self::Error> {
        let topic_code = raw
            .topic_code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or("missing topicCode")?;
        let topic_id = raw
            .topic_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or("missing topicId")?;

        Ok(Topic {
            topic_code,
            topic_id,
            topic_title: raw.topic_title.unwrap_or_default(),
            component: raw.component,
            topic_status: raw.topic_status,
            solicitation_title: raw.solicitation_title,
            program_year: raw.program_year,
            release_number: raw.release_number,
            technology_area: raw.technology_area,
            keywords: raw.keywords,
        })
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Scalar that may arrive as a string or a number
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Float(f64),
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }),
    )
}

fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.and_then(|v| match v {
            StringOrNumber::String(s) => s.trim().parse().ok(),
            StringOrNumber::Int(n) => i32::try_from(n).ok(),
            StringOrNumber::Float(_) => None,
        }),
    )
}

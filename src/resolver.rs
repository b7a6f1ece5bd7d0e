//! Topic code to upstream id resolution
//!
//! The catalog only exposes PDFs by opaque topic id, while users select
//! topics by code. Resolution re-runs the caller's search over a wide window
//! and looks each requested code up in the returned page.

use crate::error::{Error, Result};
use crate::gateway::TopicGateway;
use crate::types::{Resolution, ResolvedTopic, SearchQuery};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Maps topic codes to upstream ids using a single wide search
#[derive(Clone, Debug)]
pub struct TopicResolver {
    lookup_page_size: u32,
}

impl TopicResolver {
    /// Create a resolver that searches `lookup_page_size` topics per lookup
    pub fn new(lookup_page_size: u32) -> Self {
        Self {
            lookup_page_size: lookup_page_size.max(1),
        }
    }

    /// Resolve `codes` against the search described by `query`
    ///
    /// Only the first page of `lookup_page_size` results is consulted; codes
    /// outside that window come back as unresolved.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] when `codes` is empty
    /// - [`Error::TopicsNotFound`] when no code resolves
    /// - any gateway error from the lookup search
    pub async fn resolve(
        &self,
        gateway: &dyn TopicGateway,
        codes: &[String],
        query: &SearchQuery,
    ) -> Result<Resolution> {
        if codes.is_empty() {
            return Err(Error::Validation("no topics selected for download".into()));
        }

        let lookup = query.widened(self.lookup_page_size);
        debug!(
            gateway = gateway.name(),
            term = lookup.normalized_term(),
            window = self.lookup_page_size,
            requested = codes.len(),
            "resolving topic codes"
        );

        let page = gateway.search(&lookup).await?;
        let table: HashMap<&str, &str> = page
            .topics
            .iter()
            .map(|t| (t.topic_code.as_str(), t.topic_id.as_str()))
            .collect();

        let mut resolution = Resolution::default();
        for code in codes {
            if resolution.resolved.iter().any(|r| &r.code == code)
                || resolution.unresolved.contains(code)
            {
                continue;
            }
            match table.get(code.as_str()) {
                Some(topic_id) => resolution
                    .resolved
                    .push(ResolvedTopic::new(code.clone(), *topic_id)),
                None => resolution.unresolved.push(code.clone()),
            }
        }

        if resolution.resolved.is_empty() {
            warn!(codes = ?resolution.unresolved, "no requested topic codes found");
            return Err(Error::TopicsNotFound {
                codes: resolution.unresolved,
            });
        }

        if !resolution.unresolved.is_empty() {
            warn!(
                unresolved = ?resolution.unresolved,
                "some topic codes not found in lookup window, continuing with the rest"
            );
        }

        info!(
            resolved = resolution.resolved.len(),
            unresolved = resolution.unresolved.len(),
            "topic codes resolved"
        );

        Ok(resolution)
    }
}

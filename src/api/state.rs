//! Application state for the API server

use crate::{Config, TopicService};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned per request; both fields are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Search and download operations
    pub service: Arc<TopicService>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service: Arc<TopicService>, config: Arc<Config>) -> Self {
        Self { service, config }
    }
}

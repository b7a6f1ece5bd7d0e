//! # sbir-topics
//!
//! Search and bulk PDF download front end for the DoD SBIR/STTR topic catalog.
//!
//! The public catalog lists topics by human-facing code, but only serves a
//! topic's PDF by an opaque upstream id. This crate bridges the two:
//!
//! - **Search** - one page of the catalog, with paging metadata
//! - **Resolve** - map selected codes back to upstream ids with a wide re-search
//! - **Aggregate** - one PDF as-is, several packed into a ZIP with error placeholders
//!
//! ## Quick Start
//!
//! ```no_run
//! use sbir_topics::{Config, DodSbirClient, HttpClientHandle, SearchQuery, TopicService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let http = HttpClientHandle::start(&config.upstream)?;
//!     let gateway = DodSbirClient::new(http.clone(), Arc::new(config.upstream.clone()));
//!     let service = TopicService::new(Arc::new(gateway), config.upstream.lookup_page_size);
//!
//!     let result = service.search(&SearchQuery::for_term("hypersonic")).await?;
//!     for topic in &result.topics {
//!         println!("{} {}", topic.topic_code, topic.topic_title);
//!     }
//!
//!     http.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Document fetching and ZIP packaging
pub mod aggregator;
/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Upstream catalog gateway
pub mod gateway;
/// Topic code resolution
pub mod resolver;
/// Search and download operations
pub mod service;
/// Core types
pub mod types;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use aggregator::ArtifactAggregator;
pub use config::{ApiConfig, Config, UpstreamConfig};
pub use error::{ApiError, Error, ErrorDetail, GatewayError, Result, ToHttpStatus};
pub use gateway::{DodSbirClient, HttpClientHandle, TopicGateway};
pub use resolver::TopicResolver;
pub use service::TopicService;
pub use types::{
    DownloadBatchRequest, DownloadBatchResult, DownloadOutcome, Resolution, ResolvedTopic,
    SearchQuery, SearchResult, Topic,
};

/// Resolve once SIGTERM or SIGINT arrives (Ctrl+C on non-Unix targets).
///
/// Pass it to [`api::start_api_server`] for graceful shutdown.
pub async fn shutdown_signal() {
    let received = wait_for_signal().await;
    tracing::info!(signal = received, "shutdown signal received");
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments; wait on whatever registered
    let terminate = signal(SignalKind::terminate())
        .inspect_err(|e| tracing::warn!(error = %e, "SIGTERM handler unavailable"))
        .ok();
    let interrupt = signal(SignalKind::interrupt())
        .inspect_err(|e| tracing::warn!(error = %e, "SIGINT handler unavailable"))
        .ok();

    match (terminate, interrupt) {
        (Some(mut terminate), Some(mut interrupt)) => tokio::select! {
            _ = terminate.recv() => "SIGTERM",
            _ = interrupt.recv() => "SIGINT",
        },
        (Some(mut terminate), None) => {
            terminate.recv().await;
            "SIGTERM"
        }
        (None, Some(mut interrupt)) => {
            interrupt.recv().await;
            "SIGINT"
        }
        (None, None) => ctrl_c().await,
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
    "ctrl-c"
}

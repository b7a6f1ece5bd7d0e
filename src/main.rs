//! sbir-topics server binary
//!
//! Reads configuration from the environment (and `.env`), starts the shared
//! upstream client and serves the REST API until SIGTERM/SIGINT.

use anyhow::Context;
use sbir_topics::{Config, DodSbirClient, HttpClientHandle, TopicService};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "sbir_topics=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(
        bind_address = %config.api.bind_address,
        search_url = %config.upstream.search_url,
        lookup_page_size = config.upstream.lookup_page_size,
        "configuration loaded"
    );

    let http = HttpClientHandle::start(&config.upstream).context("failed to start HTTP client")?;
    let gateway = DodSbirClient::new(http.clone(), Arc::new(config.upstream.clone()));
    let service = Arc::new(TopicService::new(
        Arc::new(gateway),
        config.upstream.lookup_page_size,
    ));

    let result =
        sbir_topics::api::start_api_server(service, Arc::new(config), sbir_topics::shutdown_signal())
            .await;

    http.shutdown();
    result.context("API server failed")?;
    Ok(())
}

//! Configuration and router construction for integration tests

use sbir_topics::config::UpstreamConfig;
use sbir_topics::{Config, DodSbirClient, HttpClientHandle, TopicService};
use std::sync::Arc;
use std::time::Duration;

/// Config whose upstream endpoints all point at `base` (a mock server URI)
pub fn config_for_upstream(base: &str) -> Config {
    let mut config = Config::default();
    config.upstream = UpstreamConfig {
        search_url: format!("{base}/topics/api/public/topics/search"),
        document_url_template: format!("{base}/topics/api/public/topics/{{topic_id}}/download/PDF"),
        questions_url_template: format!("{base}/topics/api/public/topics/{{topic_id}}/questions"),
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
        ..UpstreamConfig::default()
    };
    config
}

/// Full router over the real reqwest gateway
pub fn create_router(config: Config) -> axum::Router {
    let http = HttpClientHandle::start(&config.upstream).expect("client should start");
    let gateway = DodSbirClient::new(http, Arc::new(config.upstream.clone()));
    let service = Arc::new(TopicService::new(
        Arc::new(gateway),
        config.upstream.lookup_page_size,
    ));
    sbir_topics::api::create_router(service, Arc::new(config))
}

/// Whether live tests against the public catalog were requested
///
/// Set `SBIR_LIVE_TESTS=1` (or in `.env`) to opt in.
pub fn live_tests_enabled() -> bool {
    dotenvy::dotenv().ok();
    std::env::var("SBIR_LIVE_TESTS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

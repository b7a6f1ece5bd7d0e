//! REST API server module
//!
//! Exposes catalog search and PDF/ZIP downloads over HTTP, with an OpenAPI 3
//! description and optional Swagger UI.

use crate::{Config, Result, TopicService};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, header::CONTENT_DISPOSITION},
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::{FAILED_TOPICS_HEADER, UNRESOLVED_TOPICS_HEADER};
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Topics
/// - `POST /api/v1/search` - Search the catalog (JSON body)
/// - `GET /api/v1/topics` - Search the catalog (query string)
/// - `GET /api/v1/topics/:topic_id/questions` - Topic Q&A
///
/// ## Downloads
/// - `POST /api/v1/download` - Download selected topics (JSON body)
/// - `POST /api/v1/download/form` - Download selected topics (HTML form)
///
/// ## System
/// - `GET /` - Welcome message
/// - `GET /api/v1/health` - Health check
/// - `GET /api/v1/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(service: Arc<TopicService>, config: Arc<Config>) -> Router {
    let state = AppState::new(service, config.clone());

    let api = Router::new()
        // Topics
        .route("/search", post(routes::search_topics))
        .route("/topics", get(routes::list_topics))
        .route("/topics/:topic_id/questions", get(routes::topic_questions))
        // Downloads
        .route("/download", post(routes::download_topics))
        .route("/download/form", post(routes::download_topics_form))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = Router::new()
        .route("/", get(routes::root))
        .nest("/api/v1", api);

    // /api/v1/openapi.json is already routed; Swagger UI serves its own copy
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        router.layer(build_cors_layer(&config.api.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin. The download headers are
/// exposed so browser clients can read the filename and the skipped codes.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let exposed: [HeaderName; 3] = [
        CONTENT_DISPOSITION,
        UNRESOLVED_TOPICS_HEADER,
        FAILED_TOPICS_HEADER,
    ];

    let allow_any = origins.iter().any(|o| o == "*");

    let cors = if allow_any || origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    };

    cors.allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(exposed)
}

/// Serve the API on the configured bind address until `shutdown` resolves
///
/// In-flight requests are allowed to finish once `shutdown` completes.
///
/// # Example
///
/// ```no_run
/// use sbir_topics::{Config, DodSbirClient, HttpClientHandle, TopicService};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::from_env()?);
/// let http = HttpClientHandle::start(&config.upstream)?;
/// let gateway = DodSbirClient::new(http.clone(), Arc::new(config.upstream.clone()));
/// let service = Arc::new(TopicService::new(Arc::new(gateway), config.upstream.lookup_page_size));
///
/// sbir_topics::api::start_api_server(service, config, sbir_topics::shutdown_signal()).await?;
/// http.shutdown();
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(
    service: Arc<TopicService>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(service, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = ?listener.local_addr().ok(),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the sbir-topics REST API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the sbir-topics REST API
///
/// The spec can be accessed via:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "sbir-topics REST API",
        version = "0.1.0",
        description = "Search the DoD SBIR/STTR topic catalog and download topic PDFs individually or as a ZIP archive",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Topics
        crate::api::routes::search_topics,
        crate::api::routes::list_topics,
        crate::api::routes::topic_questions,

        // Downloads
        crate::api::routes::download_topics,
        crate::api::routes::download_topics_form,

        // System
        crate::api::routes::root,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::Topic,
        crate::types::SearchQuery,
        crate::types::SearchResult,
        crate::types::ArchiveEntry,
        crate::types::ArchiveEntryKind,

        // API request/response types from routes
        crate::api::routes::SearchRequest,
        crate::api::routes::DownloadRequest,
        crate::api::routes::DownloadForm,
        crate::api::routes::WelcomeResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "topics", description = "Catalog search - Find open and pre-release SBIR/STTR topics"),
        (name = "downloads", description = "Downloads - Fetch topic PDFs, several at once as a ZIP archive"),
        (name = "system", description = "System endpoints - Health check, OpenAPI spec"),
    )
)]
pub struct ApiDoc;

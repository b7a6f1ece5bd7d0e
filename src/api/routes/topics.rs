//! Catalog search and topic Q&A handlers.

use super::SearchRequest;
use crate::api::AppState;
use crate::error::Error;
use crate::types::SearchQuery;
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};

/// POST /search - Search the topic catalog
#[utoipa::path(
    post,
    path = "/api/v1/search",
    tag = "topics",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "One page of matching topics", body = crate::types::SearchResult),
        (status = 400, description = "Invalid search parameters", body = crate::error::ApiError),
        (status = 502, description = "Upstream catalog failed or timed out", body = crate::error::ApiError)
    )
)]
pub async fn search_topics(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return Error::Validation(rejection.body_text()).into_response(),
    };

    let query = SearchQuery::from(request);
    match state.service.search(&query).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "search failed");
            e.into_response()
        }
    }
}

/// GET /topics - Search the topic catalog via query string
#[utoipa::path(
    get,
    path = "/api/v1/topics",
    tag = "topics",
    params(SearchQuery),
    responses(
        (status = 200, description = "One page of matching topics", body = crate::types::SearchResult),
        (status = 400, description = "Invalid search parameters", body = crate::error::ApiError),
        (status = 502, description = "Upstream catalog failed or timed out", body = crate::error::ApiError)
    )
)]
pub async fn list_topics(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return Error::Validation(rejection.body_text()).into_response(),
    };

    match state.service.search(&query).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "topic listing failed");
            e.into_response()
        }
    }
}

/// GET /topics/:topic_id/questions - Published Q&A for a topic
#[utoipa::path(
    get,
    path = "/api/v1/topics/{topic_id}/questions",
    tag = "topics",
    params(
        ("topic_id" = String, Path, description = "Upstream topic id (not the topic code)")
    ),
    responses(
        (status = 200, description = "Questions and answers as returned by the catalog"),
        (status = 404, description = "Topic unknown upstream", body = crate::error::ApiError),
        (status = 502, description = "Upstream catalog failed or timed out", body = crate::error::ApiError)
    )
)]
pub async fn topic_questions(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> Response {
    match state.service.topic_questions(&topic_id).await {
        Ok(questions) => Json(questions).into_response(),
        Err(e) => {
            tracing::warn!(topic_id = %topic_id, error = %e, "questions lookup failed");
            e.into_response()
        }
    }
}

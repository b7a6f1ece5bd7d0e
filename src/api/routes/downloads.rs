//! PDF and ZIP download handlers.

use super::{DownloadForm, DownloadRequest};
use crate::api::AppState;
use crate::error::Error;
use crate::types::{DownloadBatchRequest, DownloadBatchResult};
use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{
        HeaderMap, HeaderName, HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};

/// Codes that were requested but not found in the lookup window
pub const UNRESOLVED_TOPICS_HEADER: HeaderName = HeaderName::from_static("x-unresolved-topics");

/// Codes whose document fetch failed and were replaced by placeholders
pub const FAILED_TOPICS_HEADER: HeaderName = HeaderName::from_static("x-failed-topics");

/// POST /download - Download selected topic PDFs
#[utoipa::path(
    post,
    path = "/api/v1/download",
    tag = "downloads",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "PDF for a single topic, ZIP archive for several",
            headers(
                ("X-Unresolved-Topics" = String, description = "Comma-separated codes that were skipped"),
                ("X-Failed-Topics" = String, description = "Comma-separated codes packed as error placeholders")
            )
        ),
        (status = 400, description = "No topics selected or malformed request", body = crate::error::ApiError),
        (status = 404, description = "None of the topics were found", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
        (status = 502, description = "Upstream catalog failed", body = crate::error::ApiError)
    )
)]
pub async fn download_topics(
    State(state): State<AppState>,
    body: Result<Json<DownloadRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return Error::Validation(rejection.body_text()).into_response(),
    };

    run_download(&state, DownloadBatchRequest::from(request)).await
}

/// POST /download/form - Download selected topic PDFs from an HTML form
#[utoipa::path(
    post,
    path = "/api/v1/download/form",
    tag = "downloads",
    request_body(content = DownloadForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "PDF for a single topic, ZIP archive for several"),
        (status = 400, description = "No topics selected or malformed form", body = crate::error::ApiError),
        (status = 404, description = "None of the topics were found", body = crate::error::ApiError),
        (status = 502, description = "Upstream catalog failed", body = crate::error::ApiError)
    )
)]
pub async fn download_topics_form(State(state): State<AppState>, body: Bytes) -> Response {
    let form = match DownloadForm::from_urlencoded(&body) {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    run_download(&state, DownloadBatchRequest::from(form)).await
}

async fn run_download(state: &AppState, request: DownloadBatchRequest) -> Response {
    tracing::info!(
        codes = ?request.codes,
        term = request.query.normalized_term(),
        "download requested"
    );

    match state.service.download_batch(&request).await {
        Ok(result) => download_response(result),
        Err(e) => {
            tracing::warn!(error = %e, "download failed");
            e.into_response()
        }
    }
}

/// Package a batch result as an attachment response
pub fn download_response(result: DownloadBatchResult) -> Response {
    let DownloadBatchResult {
        outcome,
        unresolved,
    } = result;

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(outcome.content_type()),
    );

    // filenames are already sanitized to [A-Za-z0-9._-]
    match HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        outcome.filename()
    )) {
        Ok(value) => {
            headers.insert(CONTENT_DISPOSITION, value);
        }
        Err(e) => tracing::warn!(filename = outcome.filename(), error = %e, "unusable filename"),
    }

    let failed: Vec<&str> = outcome.failed_codes();
    insert_code_list(&mut headers, UNRESOLVED_TOPICS_HEADER, &unresolved);
    insert_code_list(&mut headers, FAILED_TOPICS_HEADER, &failed);

    (StatusCode::OK, headers, outcome.into_bytes()).into_response()
}

fn insert_code_list<S: AsRef<str>>(headers: &mut HeaderMap, name: HeaderName, codes: &[S]) {
    if codes.is_empty() {
        return;
    }
    let joined = codes
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join(",");
    match HeaderValue::from_str(&joined) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => tracing::warn!(header = %name, error = %e, "topic codes not representable as header"),
    }
}

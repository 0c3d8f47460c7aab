//! Signed blob downloads.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::super::error::{ApiError, ApiResult};
use super::super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: i64,
    pub sig: String,
}

/// GET /blobs/:filename?expires=&sig=
pub async fn fetch(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    Query(query): Query<SignedQuery>,
) -> ApiResult<Response> {
    let now = chrono::Utc::now().timestamp();
    if !state.signer.verify(&filename, query.expires, &query.sig, now) {
        return Err(ApiError::Unauthorized("Invalid or expired link".into()));
    }
    let bytes = state
        .blobs
        .get(&filename)
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found".into()))?;
    let mime = mime_guess::from_path(&filename).first_or_octet_stream().to_string();
    Ok((
        [
            (header::CONTENT_TYPE, mime),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        bytes,
    )
        .into_response())
}

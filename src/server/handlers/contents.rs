//! Saved content snapshots kept on the server.

use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::super::auth::AuthUser;
use super::super::error::{ApiError, ApiResult};
use super::super::models::{ContentList, CreateContentRequest, Success};
use super::super::state::AppState;
use crate::state::SavedContent;
use crate::template::TemplateData;
use crate::template::defaults::default_block;

const KEY_PREFIX: &str = "content:";

/// GET /saved-contents - newest first.
pub async fn list(State(state): State<Arc<AppState>>, _user: AuthUser) -> ApiResult<Json<ContentList>> {
    let mut contents: Vec<SavedContent> = state
        .kv
        .get_by_prefix(KEY_PREFIX)
        .await?
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    contents.sort_by_key(|c| std::cmp::Reverse(c.timestamp));
    Ok(Json(ContentList { contents }))
}

/// POST /saved-contents
pub async fn create(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<CreateContentRequest>,
) -> ApiResult<Json<SavedContent>> {
    let kind = req
        .template_type
        .ok_or_else(|| ApiError::BadRequest("templateType is required".into()))?;
    let data = req.data.ok_or_else(|| ApiError::BadRequest("data is required".into()))?;

    let mut merged = default_block(kind).clone();
    merged.extend(data.iter().filter(|(_, v)| !v.is_null()).map(|(k, v)| (k.clone(), v.clone())));
    TemplateData::from_block(kind, &merged).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let title = if req.title.trim().is_empty() {
        kind.label().to_string()
    } else {
        req.title.trim().to_string()
    };
    let content = SavedContent::new(kind, data, title);
    let value = serde_json::to_value(&content).map_err(|e| ApiError::Internal(e.to_string()))?;
    state.kv.set(&format!("{}{}", KEY_PREFIX, content.id), value).await?;
    tracing::info!(id = %content.id, template = %kind, "saved content");
    Ok(Json(content))
}

/// DELETE /saved-contents/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Success>> {
    let key = format!("{}{}", KEY_PREFIX, id);
    if state.kv.get(&key).await?.is_none() {
        return Err(ApiError::NotFound("Content not found".into()));
    }
    state.kv.del(&key).await?;
    Ok(Json(Success::ok()))
}

//! App-wide defaults shared between browsers and machines.

use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;

use super::super::auth::AuthUser;
use super::super::error::{ApiError, ApiResult};
use super::super::models::Success;
use super::super::state::AppState;
use crate::template::TemplateType;

pub const APP_DEFAULTS_KEY: &str = "app:defaults";

/// GET /app-defaults - readable without a session; `{}` when nothing is stored.
pub async fn get(State(state): State<Arc<AppState>>) -> Json<Value> {
    match state.kv.get(APP_DEFAULTS_KEY).await {
        Ok(Some(value)) => Json(value),
        Ok(None) => Json(json!({})),
        Err(e) => {
            tracing::warn!(error = %e, "app defaults unavailable");
            Json(json!({}))
        }
    }
}

/// POST /app-defaults
pub async fn set(State(state): State<Arc<AppState>>, _user: AuthUser, Json(body): Json<Value>) -> ApiResult<Json<Success>> {
    let template_data = body
        .get("templateData")
        .filter(|v| v.is_object())
        .cloned()
        .ok_or_else(|| ApiError::BadRequest("templateData is required".into()))?;
    let text = |key: &str| body.get(key).and_then(Value::as_str).unwrap_or("").to_string();
    let selected = body
        .get("selectedTemplate")
        .and_then(Value::as_str)
        .unwrap_or(TemplateType::HorizontalCard.id())
        .to_string();

    let record = json!({
        "templateData": template_data,
        "appTitle": text("appTitle"),
        "appSubtitle": text("appSubtitle"),
        "selectedTemplate": selected,
    });
    state.kv.set(APP_DEFAULTS_KEY, record).await?;
    tracing::info!(%selected, "saved app defaults");
    Ok(Json(Success::ok()))
}

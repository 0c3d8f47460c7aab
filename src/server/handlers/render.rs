//! Server-side card rasterization.

use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::super::auth::AuthUser;
use super::super::error::{ApiError, ApiResult};
use super::super::models::RenderRequest;
use super::super::state::AppState;
use crate::render::images::ImageSet;
use crate::render::{EXPORT_PIXEL_RATIO, RenderContext, check_pixel_ratio, export};
use crate::state::migrate::migrate_block;
use crate::template::TemplateData;
use crate::template::defaults::default_block;

/// POST /render - PNG of a template record. Only inline `data:` images are
/// resolved; other references render as broken.
pub async fn render(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<RenderRequest>,
) -> ApiResult<Response> {
    let kind = req.template_type;
    let ratio = check_pixel_ratio(req.pixel_ratio.unwrap_or(EXPORT_PIXEL_RATIO))?;

    let mut fields = req.data;
    fields.retain(|_, v| !v.is_null());
    migrate_block(kind, &mut fields, 0);
    let mut block = default_block(kind).clone();
    block.extend(fields);
    let data = TemplateData::from_block(kind, &block).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let fonts = state.fonts.clone();
    let out = tokio::task::spawn_blocking(move || {
        let mut images = ImageSet::new();
        images.load_inline(&data);
        export(&data, &RenderContext::new(&fonts, &images), ratio)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("render task failed: {}", e)))??;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", out.filename),
            ),
        ],
        out.png,
    )
        .into_response())
}

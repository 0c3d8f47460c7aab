//! Image collection handlers: plain uploads per kind and saved card-news PNGs.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;

use super::super::auth::AuthUser;
use super::super::error::{ApiError, ApiResult};
use super::super::models::{ImageKind, ImageList, SaveImageRequest, StoredImage, Success, UploadRequest, UploadResponse};
use super::super::state::AppState;
use crate::editor::decode_data_url;

/// `GET|POST /{kind}-images`, `DELETE /{kind}-images/:id` for every upload kind,
/// plus `POST /save-image`, `GET /images` and `DELETE /images/:id`.
pub fn routes() -> Router<Arc<AppState>> {
    let mut router = Router::new()
        .route("/save-image", post(save_card))
        .route("/images", get(|State(state): State<Arc<AppState>>, _user: AuthUser| list(ImageKind::CardNews, state)))
        .route(
            "/images/:id",
            delete(|State(state): State<Arc<AppState>>, _user: AuthUser, Path(id): Path<String>| {
                remove(ImageKind::CardNews, state, id)
            }),
        );

    for kind in ImageKind::UPLOADS {
        router = router
            .route(
                &format!("/{}", kind.route()),
                get(move |State(state): State<Arc<AppState>>, _user: AuthUser| list(kind, state)).post(
                    move |State(state): State<Arc<AppState>>, _user: AuthUser, Json(req): Json<UploadRequest>| {
                        upload(kind, state, req)
                    },
                ),
            )
            .route(
                &format!("/{}/:id", kind.route()),
                delete(move |State(state): State<Arc<AppState>>, _user: AuthUser, Path(id): Path<String>| {
                    remove(kind, state, id)
                }),
            );
    }
    router
}

/// Decode a data-URL or bare base64 payload into its MIME type and bytes.
fn decode_image_data(data: &str) -> ApiResult<(Option<String>, Vec<u8>)> {
    let data = data.trim();
    if data.starts_with("data:") {
        let (mime, bytes) = decode_data_url(data).map_err(|e| ApiError::BadRequest(format!("Invalid imageData: {}", e)))?;
        return Ok((Some(mime), bytes));
    }
    let bytes = STANDARD
        .decode(data)
        .map_err(|e| ApiError::BadRequest(format!("Invalid imageData: {}", e)))?;
    Ok((None, bytes))
}

/// Millisecond timestamp id, bumped past any existing record.
async fn next_id(state: &AppState, kind: ImageKind) -> ApiResult<String> {
    let mut ts = chrono::Utc::now().timestamp_millis();
    while state.kv.get(&format!("{}{}", kind.key_prefix(), ts)).await?.is_some() {
        ts += 1;
    }
    Ok(ts.to_string())
}

async fn store(
    state: &AppState,
    kind: ImageKind,
    bytes: Vec<u8>,
    extension: &str,
    name: Option<String>,
    metadata: Option<serde_json::Value>,
) -> ApiResult<UploadResponse> {
    let id = next_id(state, kind).await?;
    let filename = format!("{}_{}.{}", kind.file_prefix(), id, extension);
    state.blobs.put(&filename, bytes).await?;

    let record = StoredImage {
        id: id.clone(),
        filename: filename.clone(),
        name,
        metadata,
        created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        url: None,
    };
    let saved = match serde_json::to_value(&record) {
        Ok(value) => state
            .kv
            .set(&format!("{}{}", kind.key_prefix(), id), value)
            .await
            .map_err(ApiError::from),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    };
    if let Err(e) = saved {
        if let Err(cleanup) = state.blobs.remove(&filename).await {
            tracing::warn!(%filename, error = %cleanup, "could not remove orphaned blob");
        }
        return Err(e);
    }

    tracing::info!(kind = kind.route(), %filename, "stored image");
    Ok(UploadResponse {
        success: true,
        id,
        filename,
    })
}

/// POST /{kind}-images
pub async fn upload(kind: ImageKind, state: Arc<AppState>, req: UploadRequest) -> ApiResult<Json<UploadResponse>> {
    if req.image_data.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing imageData".into()));
    }
    let (mime, bytes) = decode_image_data(&req.image_data)?;
    let extension = match (kind, mime.as_deref()) {
        (ImageKind::Text, Some("image/svg+xml")) => "svg",
        _ => "png",
    };
    let name = req
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| kind.default_name().map(str::to_string));
    Ok(Json(store(&state, kind, bytes, extension, name, None).await?))
}

/// POST /save-image
pub async fn save_card(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<SaveImageRequest>,
) -> ApiResult<Json<UploadResponse>> {
    let metadata = req.metadata.filter(|m| !m.is_null());
    let (true, Some(metadata)) = (!req.image_data.trim().is_empty(), metadata) else {
        return Err(ApiError::BadRequest("Missing imageData or metadata".into()));
    };
    let (_, bytes) = decode_image_data(&req.image_data)?;
    Ok(Json(store(&state, ImageKind::CardNews, bytes, "png", None, Some(metadata)).await?))
}

/// GET /{kind}-images, GET /images: newest first, each with a signed URL.
pub async fn list(kind: ImageKind, state: Arc<AppState>) -> ApiResult<Json<ImageList>> {
    let now = chrono::Utc::now().timestamp();
    let mut images: Vec<StoredImage> = state
        .kv
        .get_by_prefix(kind.key_prefix())
        .await?
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<StoredImage>(v) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(kind = kind.route(), error = %e, "skipping malformed image record");
                None
            }
        })
        .collect();
    images.sort_by_key(|img| std::cmp::Reverse(img.id.parse::<i64>().unwrap_or(0)));
    for image in &mut images {
        image.url = Some(state.signer.sign(&image.filename, now));
    }
    Ok(Json(ImageList { images }))
}

/// DELETE /{kind}-images/:id, DELETE /images/:id
pub async fn remove(kind: ImageKind, state: Arc<AppState>, id: String) -> ApiResult<Json<Success>> {
    let key = format!("{}{}", kind.key_prefix(), id);
    let record = state
        .kv
        .get(&key)
        .await?
        .and_then(|v| serde_json::from_value::<StoredImage>(v).ok())
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", kind.label())))?;
    state.blobs.remove(&record.filename).await?;
    state.kv.del(&key).await?;
    tracing::info!(kind = kind.route(), filename = %record.filename, "deleted image");
    Ok(Json(Success::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CardNewsError, Result};
    use crate::render::font::FontBook;
    use crate::server::state::ServerConfig;
    use crate::server::storage::{BlobStore, KvStore, MemoryBlobs};
    use async_trait::async_trait;
    use serde_json::Value;

    /// Accepts reads, refuses every write.
    struct ReadOnlyKv;

    #[async_trait]
    impl KvStore for ReadOnlyKv {
        async fn get(&self, _key: &str) -> Result<Option<Value>> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: Value) -> Result<()> {
            Err(CardNewsError::Storage("read-only".into()))
        }
        async fn del(&self, _key: &str) -> Result<()> {
            Err(CardNewsError::Storage("read-only".into()))
        }
        async fn get_by_prefix(&self, _prefix: &str) -> Result<Vec<Value>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_failed_record_write_removes_blob() {
        let blobs = Arc::new(MemoryBlobs::new());
        let config = ServerConfig {
            dev_mode: true,
            ..ServerConfig::default()
        };
        let state = AppState::with_stores(config, Arc::new(ReadOnlyKv), blobs.clone(), FontBook::bitmap()).unwrap();

        let err = store(&state, ImageKind::Logo, vec![1, 2, 3], "png", None, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(blobs.len().await, 0);
    }

    #[test]
    fn test_decode_image_data() {
        let (mime, bytes) = decode_image_data("data:image/svg+xml;base64,PHN2Zy8+").unwrap();
        assert_eq!(mime.as_deref(), Some("image/svg+xml"));
        assert_eq!(bytes, b"<svg/>");

        let (mime, bytes) = decode_image_data("PHN2Zy8+").unwrap();
        assert_eq!(mime, None);
        assert_eq!(bytes, b"<svg/>");

        assert!(matches!(decode_image_data("%%%"), Err(ApiError::BadRequest(_))));
    }
}

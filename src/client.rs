//! HTTP client for the card-news backend.
//!
//! Every call is awaited on its own; failures come back as
//! [`CardNewsError::Api`] (the server's `{"error"}` message) or
//! [`CardNewsError::Transport`] and never touch editor state.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::editor::Upload;
use crate::error::{CardNewsError, Result};
use crate::render::Export;
use crate::server::models::{
    CardMetadata, ContentList, CreateContentRequest, ImageKind, ImageList, LoginRequest, LoginResponse,
    SaveImageRequest, SessionResponse, StoredImage, UploadRequest, UploadResponse, User,
};
use crate::state::{AppDefaults, SavedContent};

/// How long the startup session check may take.
pub const SESSION_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// * `base_url` - e.g. `http://localhost:8080`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let response = self
            .authorized(req)
            .send()
            .await
            .map_err(|e| CardNewsError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CardNewsError::Api(error_message(status.as_u16(), &body)));
        }
        response
            .json()
            .await
            .map_err(|e| CardNewsError::Schema(format!("unexpected response: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.http.get(self.url(path))).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.send::<serde_json::Value>(self.http.delete(self.url(path))).await?;
        Ok(())
    }

    pub async fn health(&self) -> Result<()> {
        self.get::<serde_json::Value>("/health").await?;
        Ok(())
    }

    /// Log in and keep the returned token for later calls.
    pub async fn login(&mut self, id: &str, password: &str) -> Result<LoginResponse> {
        let req = LoginRequest {
            id: id.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post("/login", &req).await?;
        self.token = Some(response.access_token.clone());
        Ok(response)
    }

    /// The session's user, or `None` when there is no token, the server
    /// rejects it, or no answer arrives within [`SESSION_CHECK_TIMEOUT`].
    pub async fn verify_session(&self) -> Result<Option<User>> {
        if self.token.is_none() {
            return Ok(None);
        }
        let check = self.send::<SessionResponse>(self.http.post(self.url("/verify-session")));
        match tokio::time::timeout(SESSION_CHECK_TIMEOUT, check).await {
            Ok(Ok(session)) => Ok(Some(session.user)),
            Ok(Err(CardNewsError::Api(msg))) => {
                tracing::info!(reason = %msg, "session rejected");
                Ok(None)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!("session check timed out");
                Ok(None)
            }
        }
    }

    pub async fn fetch_defaults(&self) -> Result<AppDefaults> {
        self.get("/app-defaults").await
    }

    pub async fn push_defaults(&self, defaults: &AppDefaults) -> Result<()> {
        if defaults.template_data.is_none() {
            return Err(CardNewsError::Validation("templateData is required".into()));
        }
        self.post::<_, serde_json::Value>("/app-defaults", defaults).await?;
        Ok(())
    }

    pub async fn upload_image(&self, kind: ImageKind, upload: &Upload) -> Result<UploadResponse> {
        if kind == ImageKind::CardNews {
            return Err(CardNewsError::Validation("card-news images are saved with metadata".into()));
        }
        let req = UploadRequest {
            image_data: upload.to_data_url(),
            name: Some(upload.name.clone()),
        };
        self.post(&format!("/{}", kind.route()), &req).await
    }

    pub async fn list_images(&self, kind: ImageKind) -> Result<Vec<StoredImage>> {
        let list: ImageList = self.get(&format!("/{}", kind.route())).await?;
        Ok(list.images)
    }

    pub async fn delete_image(&self, kind: ImageKind, id: &str) -> Result<()> {
        self.delete(&format!("/{}/{}", kind.route(), id)).await
    }

    /// Save an exported PNG together with the record it was rendered from.
    pub async fn save_card(&self, export: &Export, metadata: &CardMetadata) -> Result<UploadResponse> {
        let req = SaveImageRequest {
            image_data: format!("data:image/png;base64,{}", STANDARD.encode(&export.png)),
            metadata: Some(serde_json::to_value(metadata)?),
        };
        self.post("/save-image", &req).await
    }

    pub async fn list_contents(&self) -> Result<Vec<SavedContent>> {
        let list: ContentList = self.get("/saved-contents").await?;
        Ok(list.contents)
    }

    pub async fn create_content(&self, content: &SavedContent) -> Result<SavedContent> {
        let req = CreateContentRequest {
            template_type: Some(content.template_type),
            data: Some(content.data.clone()),
            title: content.title.clone(),
        };
        self.post("/saved-contents", &req).await
    }

    pub async fn delete_content(&self, id: &str) -> Result<()> {
        self.delete(&format!("/saved-contents/{}", id)).await
    }
}

/// `{"error": …}` from the body when present, else the raw body.
fn error_message(status: u16, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());
    format!("{} ({})", message, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(404, r#"{"error":"Image not found"}"#), "Image not found (404)");
        assert_eq!(error_message(502, "bad gateway"), "bad gateway (502)");
    }

    #[test]
    fn test_url_join() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.url("/health"), "http://localhost:8080/health");
        assert_eq!(client.url("images/1"), "http://localhost:8080/images/1");
    }

    #[tokio::test]
    async fn test_verify_without_token_is_none() {
        let client = ApiClient::new("http://127.0.0.1:9");
        assert_eq!(client.verify_session().await.unwrap(), None);
    }
}

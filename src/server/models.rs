//! Request and response bodies shared by the handlers and the API client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::template::{TemplateBlock, TemplateType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub id: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Image upload body. `image_data` is a base64 data-URL (or bare base64).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub image_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Card-news image save body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveImageRequest {
    #[serde(default)]
    pub image_data: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub id: String,
    pub filename: String,
}

/// Stored image record, with a signed URL added on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub id: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Card-news images carry the record they were rendered from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageList {
    pub images: Vec<StoredImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    pub template_type: Option<TemplateType>,
    #[serde(default)]
    pub data: Option<TemplateBlock>,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentList {
    pub contents: Vec<crate::state::SavedContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template_type: TemplateType,
    #[serde(default)]
    pub data: TemplateBlock,
    #[serde(default)]
    pub pixel_ratio: Option<f32>,
}

/// Card-news image metadata: the template id plus the record's fields, flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMetadata {
    pub template: TemplateType,
    #[serde(flatten)]
    pub data: TemplateBlock,
}

/// Server-side image collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Profile,
    Background,
    Text,
    Logo,
    /// Exported card-news PNGs saved with their metadata.
    CardNews,
}

impl ImageKind {
    /// Collections that take plain uploads.
    pub const UPLOADS: [ImageKind; 4] = [
        ImageKind::Profile,
        ImageKind::Background,
        ImageKind::Text,
        ImageKind::Logo,
    ];

    /// Route segment: `/profile-images`, …, `/images`.
    pub fn route(self) -> &'static str {
        match self {
            ImageKind::Profile => "profile-images",
            ImageKind::Background => "background-images",
            ImageKind::Text => "text-images",
            ImageKind::Logo => "logo-images",
            ImageKind::CardNews => "images",
        }
    }

    pub fn key_prefix(self) -> &'static str {
        match self {
            ImageKind::Profile => "profile:",
            ImageKind::Background => "background:",
            ImageKind::Text => "textimage:",
            ImageKind::Logo => "logo:",
            ImageKind::CardNews => "cardnews:",
        }
    }

    pub fn file_prefix(self) -> &'static str {
        match self {
            ImageKind::Profile => "profile",
            ImageKind::Background => "background",
            ImageKind::Text => "text",
            ImageKind::Logo => "logo",
            ImageKind::CardNews => "cardnews",
        }
    }

    /// Name stored when the upload carries none.
    pub fn default_name(self) -> Option<&'static str> {
        match self {
            ImageKind::Profile => Some("후보 얼굴"),
            ImageKind::Background => Some("배경 이미지"),
            ImageKind::Text => Some("텍스트 이미지"),
            ImageKind::Logo => Some("로고 이미지"),
            ImageKind::CardNews => None,
        }
    }

    /// Used in "… not found" messages.
    pub fn label(self) -> &'static str {
        match self {
            ImageKind::Profile => "Profile image",
            ImageKind::Background => "Background image",
            ImageKind::Text => "Text image",
            ImageKind::Logo => "Logo image",
            ImageKind::CardNews => "Image",
        }
    }

    pub fn parse(s: &str) -> Option<ImageKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "profile" => Some(ImageKind::Profile),
            "background" => Some(ImageKind::Background),
            "text" => Some(ImageKind::Text),
            "logo" => Some(ImageKind::Logo),
            "cardnews" | "card" => Some(ImageKind::CardNews),
            _ => None,
        }
    }
}

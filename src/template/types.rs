//! Typed template records.
//!
//! Every struct deserializes with `#[serde(default)]` so a block that is
//! missing fields still validates; a block whose fields have the wrong JSON
//! type (a number where a list is expected, say) fails with a schema error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{TemplateBlock, TemplateType};
use crate::error::{CardNewsError, Result};

/// Three-column footer shown at the bottom of every template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CopyrightArea {
    pub left1: String,
    pub left2: String,
    pub center_name: String,
    pub right1: String,
    pub right2: String,
    pub right3: String,
    /// Word highlighted in the first left line.
    pub highlight_word: String,
    /// Word highlighted in the second left line; falls back to `highlight_word`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_word2: Option<String>,
}

impl CopyrightArea {
    pub fn is_blank(&self) -> bool {
        [
            &self.left1,
            &self.left2,
            &self.center_name,
            &self.right1,
            &self.right2,
            &self.right3,
        ]
        .iter()
        .all(|s| s.trim().is_empty())
    }

    /// Highlight word for the second left line.
    pub fn second_highlight(&self) -> &str {
        self.highlight_word2
            .as_deref()
            .unwrap_or(&self.highlight_word)
    }
}

/// A headline line with its own color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Headline {
    pub text: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HorizontalCardData {
    pub headline1: String,
    pub headline2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline1_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline2_color: Option<String>,
    pub subheadline: String,
    pub items: Vec<String>,
    pub icon_names: Vec<String>,
    pub bg_color: String,
    pub image_url: String,
    pub background_image_url: String,
    pub text_image_urls: Vec<String>,
    pub logo_url: String,
    pub copyright_area: CopyrightArea,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuadLayoutData {
    pub headlines: Vec<Headline>,
    pub bg_color: String,
    pub image_url: String,
    pub background_image_url: String,
    pub text_image_urls: Vec<String>,
    pub logo_url: String,
    pub items: Vec<String>,
    pub item_details: Vec<Vec<String>>,
    pub icon_names: Vec<String>,
    pub copyright_area: CopyrightArea,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerticalListCardData {
    pub headlines: Vec<Headline>,
    pub bg_color: String,
    pub image_url: String,
    pub background_image_url: String,
    pub text_image_urls: Vec<String>,
    pub logo_url: String,
    pub items: Vec<String>,
    pub icon_names: Vec<String>,
    pub copyright_area: CopyrightArea,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerticalCardData {
    pub headline1: String,
    pub headline2: String,
    pub subheadline: String,
    pub body_texts: Vec<String>,
    pub bg_color: String,
    pub image_url: String,
    pub background_image_url: String,
    pub text_image_urls: Vec<String>,
    pub logo_url: String,
    pub copyright_area: CopyrightArea,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SquareLayoutData {
    pub headline1: String,
    pub headline2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline1_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline2_color: Option<String>,
    pub body_text: String,
    pub image1: String,
    pub image2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image1_caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image2_caption: Option<String>,
    pub bg_color: String,
    pub logo_url: String,
    pub copyright_area: CopyrightArea,
}

/// Validated record for one template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateData {
    HorizontalCard(HorizontalCardData),
    QuadLayout(QuadLayoutData),
    VerticalListCard(VerticalListCardData),
    VerticalCard(VerticalCardData),
    SquareLayout(SquareLayoutData),
}

fn parse<T: serde::de::DeserializeOwned>(kind: TemplateType, block: &TemplateBlock) -> Result<T> {
    // Top-level nulls mean "unset" and fall back to the field default.
    let present: TemplateBlock = block
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    serde_json::from_value(Value::Object(present))
        .map_err(|e| CardNewsError::Schema(format!("{}: {}", kind, e)))
}

impl TemplateData {
    /// Validate a flat block into the typed record for `kind`.
    pub fn from_block(kind: TemplateType, block: &TemplateBlock) -> Result<Self> {
        Ok(match kind {
            TemplateType::HorizontalCard => TemplateData::HorizontalCard(parse(kind, block)?),
            TemplateType::QuadLayout => TemplateData::QuadLayout(parse(kind, block)?),
            TemplateType::VerticalListCard => TemplateData::VerticalListCard(parse(kind, block)?),
            TemplateType::VerticalCard => TemplateData::VerticalCard(parse(kind, block)?),
            TemplateType::SquareLayout => TemplateData::SquareLayout(parse(kind, block)?),
        })
    }

    /// Flatten back into a JSON block.
    pub fn to_block(&self) -> TemplateBlock {
        let value = match self {
            TemplateData::HorizontalCard(d) => serde_json::to_value(d),
            TemplateData::QuadLayout(d) => serde_json::to_value(d),
            TemplateData::VerticalListCard(d) => serde_json::to_value(d),
            TemplateData::VerticalCard(d) => serde_json::to_value(d),
            TemplateData::SquareLayout(d) => serde_json::to_value(d),
        };
        match value {
            Ok(Value::Object(map)) => map,
            _ => TemplateBlock::new(),
        }
    }

    pub fn template_type(&self) -> TemplateType {
        match self {
            TemplateData::HorizontalCard(_) => TemplateType::HorizontalCard,
            TemplateData::QuadLayout(_) => TemplateType::QuadLayout,
            TemplateData::VerticalListCard(_) => TemplateType::VerticalListCard,
            TemplateData::VerticalCard(_) => TemplateType::VerticalCard,
            TemplateData::SquareLayout(_) => TemplateType::SquareLayout,
        }
    }

    pub fn copyright_area(&self) -> &CopyrightArea {
        match self {
            TemplateData::HorizontalCard(d) => &d.copyright_area,
            TemplateData::QuadLayout(d) => &d.copyright_area,
            TemplateData::VerticalListCard(d) => &d.copyright_area,
            TemplateData::VerticalCard(d) => &d.copyright_area,
            TemplateData::SquareLayout(d) => &d.copyright_area,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(value: Value) -> TemplateBlock {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_partial_block_validates() {
        let data = TemplateData::from_block(
            TemplateType::VerticalCard,
            &block(json!({"headline1": "A", "bodyTexts": ["x", "y"]})),
        )
        .unwrap();
        match data {
            TemplateData::VerticalCard(d) => {
                assert_eq!(d.headline1, "A");
                assert_eq!(d.body_texts, vec!["x", "y"]);
                assert!(d.copyright_area.is_blank());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_wrong_type_is_schema_error() {
        let err = TemplateData::from_block(
            TemplateType::QuadLayout,
            &block(json!({"items": 42})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("quad-layout"));
    }

    #[test]
    fn test_to_block_uses_camel_case() {
        let data = TemplateData::SquareLayout(SquareLayoutData {
            image1_caption: Some("cap".into()),
            ..Default::default()
        });
        let b = data.to_block();
        assert_eq!(b["image1Caption"], json!("cap"));
        assert!(b.contains_key("copyrightArea"));
        assert!(!b.contains_key("headline1Color"));
    }

    #[test]
    fn test_second_highlight_falls_back() {
        let mut area = CopyrightArea {
            highlight_word: "전북".into(),
            ..Default::default()
        };
        assert_eq!(area.second_highlight(), "전북");
        area.highlight_word2 = Some("도약".into());
        assert_eq!(area.second_highlight(), "도약");
    }
}

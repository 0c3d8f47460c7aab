//! # Templates
//!
//! The five fixed card layouts, their canvas sizes, and the record types that
//! describe what each layout displays.
//!
//! Records travel in two shapes:
//!
//! - [`TemplateBlock`]: a flat JSON object (field name → value). This is what
//!   gets persisted, merged and migrated, because old blobs may carry fields
//!   that no longer exist in the typed schema.
//! - [`TemplateData`]: the validated, typed view used by the renderers.

pub mod defaults;
pub mod icons;
pub mod types;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{CardNewsError, Result};

pub use types::{
    CopyrightArea, Headline, HorizontalCardData, QuadLayoutData, SquareLayoutData, TemplateData,
    VerticalCardData, VerticalListCardData,
};

/// One template's fields as a flat JSON object.
pub type TemplateBlock = serde_json::Map<String, serde_json::Value>;

/// Every template's block, keyed by template.
pub type TemplateSet = BTreeMap<TemplateType, TemplateBlock>;

/// Default canvas width shared by all templates.
pub const CANVAS_WIDTH: u32 = 720;
/// Canvas height of the vertical card.
pub const TALL_CANVAS_HEIGHT: u32 = 1200;
/// Canvas height of the short layouts.
pub const SHORT_CANVAS_HEIGHT: u32 = 1080;

/// Template identifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateType {
    #[default]
    HorizontalCard,
    QuadLayout,
    VerticalListCard,
    VerticalCard,
    SquareLayout,
}

impl TemplateType {
    /// All templates in display order.
    pub const ALL: [TemplateType; 5] = [
        TemplateType::HorizontalCard,
        TemplateType::QuadLayout,
        TemplateType::VerticalListCard,
        TemplateType::VerticalCard,
        TemplateType::SquareLayout,
    ];

    /// Stable identifier used in storage keys, URLs and export filenames.
    pub fn id(self) -> &'static str {
        match self {
            TemplateType::HorizontalCard => "horizontal-card",
            TemplateType::QuadLayout => "quad-layout",
            TemplateType::VerticalListCard => "vertical-list-card",
            TemplateType::VerticalCard => "vertical-card",
            TemplateType::SquareLayout => "square-layout",
        }
    }

    /// Human-readable name shown in listings.
    pub fn label(self) -> &'static str {
        match self {
            TemplateType::HorizontalCard => "가로형 카드",
            TemplateType::QuadLayout => "4분할 레이아웃",
            TemplateType::VerticalListCard => "세로 리스트 카드",
            TemplateType::VerticalCard => "세로형 카드",
            TemplateType::SquareLayout => "사각 2단 레이아웃",
        }
    }

    /// Canvas size in logical pixels (width, height).
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            TemplateType::HorizontalCard
            | TemplateType::QuadLayout
            | TemplateType::VerticalListCard => (CANVAS_WIDTH, SHORT_CANVAS_HEIGHT),
            TemplateType::VerticalCard => (CANVAS_WIDTH, TALL_CANVAS_HEIGHT),
            TemplateType::SquareLayout => (CANVAS_WIDTH, CANVAS_WIDTH),
        }
    }

    /// Every field name a record of this template accepts.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            TemplateType::HorizontalCard => &[
                "headline1", "headline2", "headline1Color", "headline2Color", "subheadline", "items",
                "iconNames", "bgColor", "imageUrl", "backgroundImageUrl", "textImageUrls", "logoUrl",
                "copyrightArea",
            ],
            TemplateType::QuadLayout => &[
                "headlines", "bgColor", "imageUrl", "backgroundImageUrl", "textImageUrls", "logoUrl",
                "items", "itemDetails", "iconNames", "copyrightArea",
            ],
            TemplateType::VerticalListCard => &[
                "headlines", "bgColor", "imageUrl", "backgroundImageUrl", "textImageUrls", "logoUrl",
                "items", "iconNames", "copyrightArea",
            ],
            TemplateType::VerticalCard => &[
                "headline1", "headline2", "subheadline", "bodyTexts", "bgColor", "imageUrl",
                "backgroundImageUrl", "textImageUrls", "logoUrl", "copyrightArea",
            ],
            TemplateType::SquareLayout => &[
                "headline1", "headline2", "headline1Color", "headline2Color", "bodyText", "image1",
                "image2", "image1Caption", "image2Caption", "bgColor", "logoUrl", "copyrightArea",
            ],
        }
    }

    pub fn has_field(self, field: &str) -> bool {
        self.fields().contains(&field)
    }

    /// Parse an identifier, returning `None` for anything unknown.
    pub fn parse(s: &str) -> Option<TemplateType> {
        TemplateType::ALL.into_iter().find(|t| t.id() == s)
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TemplateType {
    type Err = CardNewsError;

    fn from_str(s: &str) -> Result<Self> {
        TemplateType::parse(s).ok_or_else(|| CardNewsError::UnknownTemplate(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for t in TemplateType::ALL {
            assert_eq!(t.id().parse::<TemplateType>().unwrap(), t);
        }
        assert!("poster".parse::<TemplateType>().is_err());
    }

    #[test]
    fn test_field_lists_cover_records() {
        for kind in TemplateType::ALL {
            for key in defaults::default_block(kind).keys() {
                assert!(kind.has_field(key), "{} default has unlisted field {}", kind, key);
            }
            for key in defaults::default_data(kind).to_block().keys() {
                assert!(kind.has_field(key), "{} record has unlisted field {}", kind, key);
            }
        }
        assert!(!TemplateType::HorizontalCard.has_field("headlin1"));
        assert!(!TemplateType::VerticalCard.has_field("items"));
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(TemplateType::HorizontalCard.dimensions(), (720, 1080));
        assert_eq!(TemplateType::QuadLayout.dimensions(), (720, 1080));
        assert_eq!(TemplateType::VerticalListCard.dimensions(), (720, 1080));
        assert_eq!(TemplateType::VerticalCard.dimensions(), (720, 1200));
        assert_eq!(TemplateType::SquareLayout.dimensions(), (720, 720));
    }

    #[test]
    fn test_serde_uses_kebab_ids() {
        let json = serde_json::to_string(&TemplateType::VerticalListCard).unwrap();
        assert_eq!(json, "\"vertical-list-card\"");

        let mut set: TemplateSet = TemplateSet::new();
        set.insert(TemplateType::SquareLayout, TemplateBlock::new());
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"square-layout":{}}"#);
    }
}

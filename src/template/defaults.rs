//! Default template registry.
//!
//! The initial field values for every template. Built once on first use and
//! shared afterwards.

use std::sync::OnceLock;

use super::icons::DEFAULT_ICON_NAMES;
use super::types::*;
use super::{TemplateBlock, TemplateSet, TemplateType};

/// Built-in portrait drawn when no profile image is chosen.
pub const DEFAULT_PROFILE_IMAGE: &str = "builtin:profile";
/// Built-in logo pinned on every template unless the user picks another one.
pub const DEFAULT_LOGO_URL: &str = "builtin:logo";
/// Base background color of all templates.
pub const DEFAULT_BG_COLOR: &str = "#2A48A0";

static REGISTRY: OnceLock<TemplateSet> = OnceLock::new();

pub fn default_copyright_area() -> CopyrightArea {
    CopyrightArea {
        left1: "가장 강력한 전북".into(),
        left2: "더불어 함께 도약".into(),
        center_name: "이원택".into(),
        right1: "전북특별자치도".into(),
        right2: "도지사 예비후보".into(),
        right3: "기호 1번".into(),
        highlight_word: "전북".into(),
        highlight_word2: None,
    }
}

fn default_items() -> Vec<String> {
    vec![
        "탄소 제로의 심장, 새만금 국제에너지도시".into(),
        "스마트 농생명, 미래 안보의 핵심".into(),
        "K컬쳐 글로벌 허브".into(),
        "지강 발전, 지역 도약 모델 창출".into(),
    ]
}

fn default_icons() -> Vec<String> {
    DEFAULT_ICON_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_headlines() -> Vec<Headline> {
    vec![
        Headline {
            text: "전북의 미래를".into(),
            color: "#FFFFFF".into(),
        },
        Headline {
            text: "새롭게 설계합니다".into(),
            color: "#FDE047".into(),
        },
    ]
}

fn build() -> TemplateSet {
    let copyright = default_copyright_area();
    let records = [
        TemplateData::HorizontalCard(HorizontalCardData {
            headline1: "전북 대전환".into(),
            headline2: "지금 시작합니다".into(),
            headline1_color: None,
            headline2_color: None,
            subheadline: "도민과 함께 여는 새로운 전북".into(),
            items: default_items(),
            icon_names: default_icons(),
            bg_color: DEFAULT_BG_COLOR.into(),
            image_url: String::new(),
            background_image_url: String::new(),
            text_image_urls: Vec::new(),
            logo_url: DEFAULT_LOGO_URL.into(),
            copyright_area: copyright.clone(),
        }),
        TemplateData::QuadLayout(QuadLayoutData {
            headlines: default_headlines(),
            bg_color: DEFAULT_BG_COLOR.into(),
            image_url: String::new(),
            background_image_url: String::new(),
            text_image_urls: Vec::new(),
            logo_url: DEFAULT_LOGO_URL.into(),
            items: default_items(),
            item_details: vec![
                vec!["해상풍력 에너지 선도".into(), "그린수소 생산기지".into()],
                vec!["푸드테크 혁신 클러스터".into(), "스마트팜 확대".into()],
                vec!["한류 콘텐츠 제작 허브".into(), "K-Pop 공연장 건립".into()],
                vec!["균형발전 특별법 제정".into(), "지역 일자리 창출".into()],
            ],
            icon_names: default_icons(),
            copyright_area: copyright.clone(),
        }),
        TemplateData::VerticalListCard(VerticalListCardData {
            headlines: default_headlines(),
            bg_color: DEFAULT_BG_COLOR.into(),
            image_url: String::new(),
            background_image_url: String::new(),
            text_image_urls: Vec::new(),
            logo_url: DEFAULT_LOGO_URL.into(),
            items: default_items(),
            icon_names: default_icons(),
            copyright_area: copyright.clone(),
        }),
        TemplateData::VerticalCard(VerticalCardData {
            headline1: "전북 대전환".into(),
            headline2: "지금 시작합니다".into(),
            subheadline: "핵심 공약".into(),
            body_texts: vec!["정책 1".into(), "정책 2".into(), "정책 3".into()],
            bg_color: DEFAULT_BG_COLOR.into(),
            image_url: String::new(),
            background_image_url: String::new(),
            text_image_urls: Vec::new(),
            logo_url: DEFAULT_LOGO_URL.into(),
            copyright_area: copyright.clone(),
        }),
        TemplateData::SquareLayout(SquareLayoutData {
            headline1: "현장에서 답을".into(),
            headline2: "찾겠습니다".into(),
            headline1_color: None,
            headline2_color: None,
            body_text: "도민의 목소리를 정책으로 만들겠습니다.".into(),
            image1: String::new(),
            image2: String::new(),
            image1_caption: None,
            image2_caption: None,
            bg_color: DEFAULT_BG_COLOR.into(),
            logo_url: DEFAULT_LOGO_URL.into(),
            copyright_area: copyright,
        }),
    ];

    records
        .into_iter()
        .map(|r| (r.template_type(), r.to_block()))
        .collect()
}

/// Code defaults for every template.
pub fn registry() -> &'static TemplateSet {
    REGISTRY.get_or_init(build)
}

/// Code defaults for one template.
pub fn default_block(kind: TemplateType) -> &'static TemplateBlock {
    // `build` inserts every variant of TemplateType::ALL.
    &registry()[&kind]
}

/// Typed code defaults for one template.
pub fn default_data(kind: TemplateType) -> TemplateData {
    match TemplateData::from_block(kind, default_block(kind)) {
        Ok(data) => data,
        Err(_) => unreachable!("registry blocks are built from typed records"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_template() {
        for kind in TemplateType::ALL {
            let block = default_block(kind);
            assert_eq!(block["logoUrl"], DEFAULT_LOGO_URL);
            assert!(block.contains_key("copyrightArea"));
            assert_eq!(default_data(kind).template_type(), kind);
        }
    }

    #[test]
    fn test_horizontal_default_icons() {
        match default_data(TemplateType::HorizontalCard) {
            TemplateData::HorizontalCard(d) => {
                assert_eq!(d.icon_names, vec!["Zap", "Sprout", "Globe", "TrendingUp"]);
                assert_eq!(d.items.len(), 4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

//! Saved content snapshots and app-wide defaults payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{CardNewsError, Result};
use crate::template::{TemplateBlock, TemplateSet, TemplateType};

use super::reconcile::template_set_from_map;

/// Immutable snapshot of one template's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedContent {
    pub id: String,
    pub template_type: TemplateType,
    pub data: TemplateBlock,
    /// Creation time, Unix milliseconds.
    pub timestamp: i64,
    pub title: String,
}

impl SavedContent {
    pub fn new(template_type: TemplateType, data: TemplateBlock, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            template_type,
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
            title: title.into(),
        }
    }
}

/// Parse the saved-contents slot.
pub fn parse_saved_contents(json: &str) -> Result<Vec<SavedContent>> {
    serde_json::from_str(json).map_err(|e| CardNewsError::Schema(format!("saved contents: {}", e)))
}

/// App-wide defaults exchanged with the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_data: Option<serde_json::Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_template: Option<String>,
}

impl AppDefaults {
    /// Server template blocks, or `None` when the payload carries none.
    pub fn templates(&self) -> Option<TemplateSet> {
        let map = self.template_data.as_ref()?;
        if map.is_empty() {
            return None;
        }
        let set = template_set_from_map(map.clone());
        (!set.is_empty()).then_some(set)
    }

    /// Selected template, if present and known.
    pub fn selected(&self) -> Option<TemplateType> {
        self.selected_template.as_deref().and_then(TemplateType::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_saved_content_wire_shape() {
        let content = SavedContent::new(TemplateType::QuadLayout, TemplateBlock::new(), "first");
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["templateType"], json!("quad-layout"));
        assert_eq!(value["title"], json!("first"));
        assert!(value["timestamp"].as_i64().unwrap() > 0);

        let list = parse_saved_contents(&serde_json::to_string(&vec![content.clone()]).unwrap()).unwrap();
        assert_eq!(list, vec![content]);
    }

    #[test]
    fn test_saved_contents_reject_bad_shape() {
        assert!(parse_saved_contents(r#"[{"id": 1}]"#).is_err());
    }

    #[test]
    fn test_app_defaults_templates() {
        let defaults: AppDefaults = serde_json::from_value(json!({
            "templateData": {"vertical-card": {"headline1": "x"}, "nope": {}},
            "selectedTemplate": "square-layout"
        }))
        .unwrap();
        let set = defaults.templates().unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(defaults.selected(), Some(TemplateType::SquareLayout));

        assert_eq!(AppDefaults::default().templates(), None);
        let empty: AppDefaults = serde_json::from_value(json!({"templateData": {}})).unwrap();
        assert_eq!(empty.templates(), None);
    }
}

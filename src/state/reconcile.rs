//! # State Reconciliation
//!
//! Produces one authoritative [`TemplateSet`] from three layers:
//!
//! ```text
//! code defaults  ←  local cache  ←  server defaults
//!                  (migrated)      (migrated)
//! ```
//!
//! A layer overrides a field only with a non-empty value, unless the base
//! field is empty too. An empty server value therefore never reverts a value
//! the user set locally. Fields the user explicitly cleared are the exception
//! on the local layer: they stay empty instead of falling back to the
//! default.
//!
//! After merging, the logo is pinned to the default when blank, the
//! copyright area is filled in when missing, and content corrections run.
//! Reconciling the output again yields the same output.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CardNewsError, Result};
use crate::template::{TemplateBlock, TemplateSet, TemplateType};

use super::empty::{has_value, is_empty};
use super::migrate::{ContentCorrections, SCHEMA_VERSION, migrate_block};

/// Fields the user explicitly cleared, per template.
pub type ClearedFields = BTreeMap<TemplateType, BTreeSet<String>>;

/// The template-data slot as written to local persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalSnapshot {
    pub version: u32,
    pub templates: TemplateSet,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cleared: ClearedFields,
}

impl LocalSnapshot {
    pub fn current(templates: TemplateSet, cleared: ClearedFields) -> Self {
        Self {
            version: SCHEMA_VERSION,
            templates,
            cleared,
        }
    }

    /// Parse the persisted slot.
    ///
    /// Accepts both the versioned envelope and the legacy shape (a bare
    /// `{templateId: block}` map, treated as version 0). Unknown template
    /// keys and non-object blocks are skipped.
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(mut root) = value else {
            return Err(CardNewsError::Schema(
                "template data must be a JSON object".into(),
            ));
        };

        let is_envelope = root.get("version").is_some_and(Value::is_u64)
            && root.get("templates").is_some_and(Value::is_object);

        if !is_envelope {
            return Ok(Self {
                version: 0,
                templates: template_set_from_map(root),
                cleared: ClearedFields::new(),
            });
        }

        let version = root
            .get("version")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| CardNewsError::Schema("invalid schema version".into()))?;
        let templates = match root.remove("templates") {
            Some(Value::Object(map)) => template_set_from_map(map),
            _ => TemplateSet::new(),
        };
        let cleared = match root.remove("cleared") {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| CardNewsError::Schema(format!("cleared fields: {}", e)))?,
            None => ClearedFields::new(),
        };

        Ok(Self {
            version,
            templates,
            cleared,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Convert a `{templateId: block}` JSON object into a [`TemplateSet`],
/// dropping unknown templates and non-object blocks.
pub fn template_set_from_map(map: serde_json::Map<String, Value>) -> TemplateSet {
    map.into_iter()
        .filter_map(|(key, value)| {
            let Some(kind) = TemplateType::parse(&key) else {
                tracing::debug!(key = %key, "skipping unknown template key");
                return None;
            };
            match value {
                Value::Object(block) => Some((kind, block)),
                _ => None,
            }
        })
        .collect()
}

/// Merge `layer` onto `base` field by field.
///
/// A field in `keep_empty` takes the layer's value even when it is empty.
pub fn merge_layer(base: &mut TemplateBlock, layer: &TemplateBlock, keep_empty: &BTreeSet<String>) {
    for (field, value) in layer {
        let empty = is_empty(Some(value));
        if empty && has_value(base.get(field)) && !keep_empty.contains(field) {
            continue;
        }
        base.insert(field.clone(), value.clone());
    }
}

/// Fix-ups applied to every merged block.
fn normalize(
    kind: TemplateType,
    block: &mut TemplateBlock,
    defaults: &TemplateBlock,
    corrections: &ContentCorrections,
) {
    if block.contains_key("logoUrl") && is_empty(block.get("logoUrl")) {
        if let Some(logo) = defaults.get("logoUrl") {
            block.insert("logoUrl".into(), logo.clone());
        }
    }

    if block.get("copyrightArea").is_none_or(Value::is_null) {
        if let Some(area) = defaults.get("copyrightArea") {
            block.insert("copyrightArea".into(), area.clone());
        }
    }

    let corrected = corrections.apply_block(block);
    if corrected > 0 {
        tracing::info!(template = %kind, corrected, "applied content corrections");
    }
}

/// Reconcile code defaults, the local cache and server defaults.
pub fn reconcile(
    defaults: &TemplateSet,
    local: Option<&LocalSnapshot>,
    server: Option<&TemplateSet>,
    corrections: &ContentCorrections,
) -> TemplateSet {
    let no_cleared = BTreeSet::new();
    let mut result = TemplateSet::new();

    for kind in TemplateType::ALL {
        let empty_block = TemplateBlock::new();
        let default_block = defaults.get(&kind).unwrap_or(&empty_block);
        let mut merged = default_block.clone();

        if let Some(snapshot) = local
            && let Some(block) = snapshot.templates.get(&kind)
        {
            let mut block = block.clone();
            migrate_block(kind, &mut block, snapshot.version);
            let cleared = snapshot.cleared.get(&kind).unwrap_or(&no_cleared);
            merge_layer(&mut merged, &block, cleared);
        }

        if let Some(server) = server
            && let Some(block) = server.get(&kind)
        {
            // Server blobs carry no version; migrations are safe to rerun.
            let mut block = block.clone();
            migrate_block(kind, &mut block, 0);
            merge_layer(&mut merged, &block, &no_cleared);
        }

        normalize(kind, &mut merged, default_block, corrections);
        result.insert(kind, merged);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::defaults::{DEFAULT_LOGO_URL, default_block, registry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn block(value: Value) -> TemplateBlock {
        value.as_object().cloned().unwrap()
    }

    fn legacy(kind: TemplateType, value: Value) -> LocalSnapshot {
        let mut templates = TemplateSet::new();
        templates.insert(kind, block(value));
        LocalSnapshot {
            version: 0,
            templates,
            cleared: ClearedFields::new(),
        }
    }

    #[test]
    fn test_no_layers_gives_defaults() {
        let out = reconcile(registry(), None, None, &ContentCorrections::none());
        assert_eq!(&out, registry());
    }

    #[test]
    fn test_empty_local_falls_back_to_default() {
        let local = legacy(
            TemplateType::VerticalCard,
            json!({"headline1": "  ", "bodyTexts": []}),
        );
        let out = reconcile(registry(), Some(&local), None, &ContentCorrections::none());
        let defaults = default_block(TemplateType::VerticalCard);
        assert_eq!(out[&TemplateType::VerticalCard]["headline1"], defaults["headline1"]);
        assert_eq!(out[&TemplateType::VerticalCard]["bodyTexts"], defaults["bodyTexts"]);
    }

    #[test]
    fn test_empty_server_keeps_local() {
        let local = legacy(TemplateType::QuadLayout, json!({"items": ["내 공약"]}));
        let mut server = TemplateSet::new();
        server.insert(TemplateType::QuadLayout, block(json!({"items": [], "bgColor": ""})));
        let out = reconcile(registry(), Some(&local), Some(&server), &ContentCorrections::none());
        assert_eq!(out[&TemplateType::QuadLayout]["items"], json!(["내 공약"]));
        assert_eq!(
            out[&TemplateType::QuadLayout]["bgColor"],
            default_block(TemplateType::QuadLayout)["bgColor"]
        );
    }

    #[test]
    fn test_non_empty_server_wins() {
        let local = legacy(TemplateType::QuadLayout, json!({"bgColor": "#000000"}));
        let mut server = TemplateSet::new();
        server.insert(TemplateType::QuadLayout, block(json!({"bgColor": "#FF0000"})));
        let out = reconcile(registry(), Some(&local), Some(&server), &ContentCorrections::none());
        assert_eq!(out[&TemplateType::QuadLayout]["bgColor"], json!("#FF0000"));
    }

    #[test]
    fn test_cleared_field_stays_empty() {
        let mut local = legacy(TemplateType::VerticalCard, json!({"subheadline": ""}));
        local.version = SCHEMA_VERSION;
        local
            .cleared
            .entry(TemplateType::VerticalCard)
            .or_default()
            .insert("subheadline".into());
        let out = reconcile(registry(), Some(&local), None, &ContentCorrections::none());
        assert_eq!(out[&TemplateType::VerticalCard]["subheadline"], json!(""));
    }

    #[test]
    fn test_blank_logo_is_pinned_even_when_cleared() {
        let mut local = legacy(TemplateType::SquareLayout, json!({"logoUrl": ""}));
        local
            .cleared
            .entry(TemplateType::SquareLayout)
            .or_default()
            .insert("logoUrl".into());
        let out = reconcile(registry(), Some(&local), None, &ContentCorrections::none());
        assert_eq!(out[&TemplateType::SquareLayout]["logoUrl"], json!(DEFAULT_LOGO_URL));
    }

    #[test]
    fn test_banned_word_example() {
        let local = legacy(TemplateType::HorizontalCard, json!({"items": ["안정 양보 정책"]}));
        let out = reconcile(registry(), Some(&local), Some(&TemplateSet::new()), &ContentCorrections::default());
        assert_eq!(out[&TemplateType::HorizontalCard]["items"], json!(["안정 안보 정책"]));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let local = legacy(
            TemplateType::HorizontalCard,
            json!({"bodyText": "양보", "copyrightUrl": "c.png", "logoUrl": null}),
        );
        let mut server = TemplateSet::new();
        server.insert(TemplateType::QuadLayout, block(json!({"headlines": [], "bgColor": "#123456"})));
        let corrections = ContentCorrections::default();

        let once = reconcile(registry(), Some(&local), Some(&server), &corrections);
        let snapshot = LocalSnapshot::current(once.clone(), ClearedFields::new());
        let twice = reconcile(registry(), Some(&snapshot), Some(&server), &corrections);
        assert_eq!(once, twice);
        assert_eq!(once[&TemplateType::HorizontalCard]["items"], json!(["안보"]));
    }

    #[test]
    fn test_parse_legacy_blob() {
        let snapshot = LocalSnapshot::parse(
            r#"{"horizontal-card": {"headline1": "x"}, "poster": {}, "quad-layout": 5}"#,
        )
        .unwrap();
        assert_eq!(snapshot.version, 0);
        assert_eq!(snapshot.templates.len(), 1);
        assert_eq!(snapshot.templates[&TemplateType::HorizontalCard]["headline1"], json!("x"));
    }

    #[test]
    fn test_parse_envelope() {
        let json = r#"{"version": 2, "templates": {"vertical-card": {}}, "cleared": {"vertical-card": ["subheadline"]}}"#;
        let snapshot = LocalSnapshot::parse(json).unwrap();
        assert_eq!(snapshot.version, 2);
        assert!(snapshot.cleared[&TemplateType::VerticalCard].contains("subheadline"));
        let again = LocalSnapshot::parse(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(again, snapshot);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(LocalSnapshot::parse("not json").is_err());
        assert!(LocalSnapshot::parse("[1, 2]").is_err());
    }
}

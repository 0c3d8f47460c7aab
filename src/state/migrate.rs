//! # Schema Migrations and Content Corrections
//!
//! Persisted template blobs carry a schema version. Structural migrations
//! are pure functions over one template block, applied in order for every
//! version above the blob's own, so each runs at most once per blob:
//!
//! | Version | Migration |
//! |---------|-----------|
//! | 1 | horizontal card `bodyText` becomes a one-element `items` list |
//! | 2 | flat `copyrightText`/`copyrightUrl` replaced by `copyrightArea` |
//!
//! Content corrections (banned word → approved word) are separate: the word
//! list is configuration, so they run on every reconciliation. Each rule is
//! idempotent because a replacement may not contain the word it replaces.

use serde_json::Value;

use crate::error::{CardNewsError, Result};
use crate::template::defaults::default_block;
use crate::template::icons::DEFAULT_ICON_NAMES;
use crate::template::{TemplateBlock, TemplateType};

use super::empty::is_empty;

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 2;

/// One structural migration step.
pub struct Migration {
    /// Version the block has after this step.
    pub version: u32,
    pub name: &'static str,
    pub apply: fn(TemplateType, &mut TemplateBlock),
}

/// Ordered migration steps.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "items-from-body-text",
        apply: items_from_body_text,
    },
    Migration {
        version: 2,
        name: "structured-copyright",
        apply: structured_copyright,
    },
];

/// Apply every migration newer than `from_version`. Returns how many ran.
pub fn migrate_block(kind: TemplateType, block: &mut TemplateBlock, from_version: u32) -> usize {
    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > from_version) {
        (migration.apply)(kind, block);
        tracing::debug!(template = %kind, migration = migration.name, "applied migration");
        applied += 1;
    }
    applied
}

fn items_from_body_text(kind: TemplateType, block: &mut TemplateBlock) {
    if kind != TemplateType::HorizontalCard {
        return;
    }
    let Some(body) = block.remove("bodyText") else {
        return;
    };
    if let Value::String(text) = &body
        && !text.is_empty()
        && is_empty(block.get("items"))
    {
        block.insert("items".into(), Value::Array(vec![body.clone()]));
        block.insert(
            "iconNames".into(),
            Value::Array(
                DEFAULT_ICON_NAMES
                    .iter()
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            ),
        );
    }
}

fn structured_copyright(kind: TemplateType, block: &mut TemplateBlock) {
    block.remove("copyrightText");
    block.remove("copyrightUrl");
    if block.get("copyrightArea").is_none_or(Value::is_null) {
        if let Some(area) = default_block(kind).get("copyrightArea") {
            block.insert("copyrightArea".into(), area.clone());
        }
    }
}

/// Upper bound on rewrite passes over one string.
const MAX_CORRECTION_PASSES: usize = 16;

/// Find-and-replace rules applied to every free-text value of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCorrections {
    rules: Vec<(String, String)>,
}

impl Default for ContentCorrections {
    fn default() -> Self {
        Self {
            rules: vec![("양보".to_string(), "안보".to_string())],
        }
    }
}

impl ContentCorrections {
    /// No corrections at all.
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// Validate a rule list. No replacement may contain any rule's search
    /// word, or a second pass would rewrite what the first one wrote.
    pub fn new(rules: Vec<(String, String)>) -> Result<Self> {
        for (from, _) in &rules {
            if from.is_empty() {
                return Err(CardNewsError::Config(
                    "correction rule has an empty search word".into(),
                ));
            }
        }
        for (from, to) in &rules {
            if let Some((other, _)) = rules.iter().find(|(other, _)| to.contains(other.as_str())) {
                return Err(CardNewsError::Config(format!(
                    "replacement '{}' (for '{}') contains the search word '{}'",
                    to, from, other
                )));
            }
        }
        Ok(Self { rules })
    }

    /// Parse `FROM=TO` specs, e.g. from the command line.
    pub fn parse<I, S>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = specs
            .into_iter()
            .map(|spec| {
                let spec = spec.as_ref();
                spec.split_once('=')
                    .map(|(from, to)| (from.trim().to_string(), to.trim().to_string()))
                    .ok_or_else(|| {
                        CardNewsError::Config(format!(
                            "invalid correction '{}', expected FROM=TO",
                            spec
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(rules)
    }

    pub fn rules(&self) -> &[(String, String)] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Correct a single string, repeating until no rule matches. Returns
    /// `None` when nothing changed.
    pub fn apply_str(&self, text: &str) -> Option<String> {
        let mut out: Option<String> = None;
        for _ in 0..MAX_CORRECTION_PASSES {
            let current = out.as_deref().unwrap_or(text);
            match self.apply_once(current) {
                Some(next) => out = Some(next),
                None => return out,
            }
        }
        tracing::warn!(text, "content corrections did not settle");
        out
    }

    fn apply_once(&self, text: &str) -> Option<String> {
        let mut out: Option<String> = None;
        for (from, to) in &self.rules {
            let current = out.as_deref().unwrap_or(text);
            if current.contains(from.as_str()) {
                out = Some(current.replace(from.as_str(), to));
            }
        }
        out
    }

    /// Correct every free-text value of a block in place. Returns the number
    /// of strings changed.
    pub fn apply_block(&self, block: &mut TemplateBlock) -> usize {
        if self.rules.is_empty() {
            return 0;
        }
        let mut changed = 0;
        for (key, value) in block.iter_mut() {
            if is_free_text_key(key) {
                changed += self.apply_value(value);
            }
        }
        changed
    }

    fn apply_value(&self, value: &mut Value) -> usize {
        match value {
            Value::String(s) => match self.apply_str(s) {
                Some(fixed) => {
                    *s = fixed;
                    1
                }
                None => 0,
            },
            Value::Array(items) => items.iter_mut().map(|v| self.apply_value(v)).sum(),
            Value::Object(map) => map
                .iter_mut()
                .filter(|(k, _)| is_free_text_key(k))
                .map(|(_, v)| self.apply_value(v))
                .sum(),
            _ => 0,
        }
    }
}

/// Colors, image references and icon tags are not free text.
fn is_free_text_key(key: &str) -> bool {
    !(key.ends_with("Url")
        || key.ends_with("Urls")
        || key.ends_with("Color")
        || key == "color"
        || key == "image1"
        || key == "image2"
        || key == "iconNames")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn block(value: Value) -> TemplateBlock {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_body_text_becomes_items() {
        let mut b = block(json!({"bodyText": "hello"}));
        migrate_block(TemplateType::HorizontalCard, &mut b, 0);
        assert_eq!(b["items"], json!(["hello"]));
        assert_eq!(b["iconNames"], json!(["Zap", "Sprout", "Globe", "TrendingUp"]));
        assert!(!b.contains_key("bodyText"));
    }

    #[test]
    fn test_body_text_dropped_when_items_exist() {
        let mut b = block(json!({"bodyText": "hello", "items": ["a"], "iconNames": ["Star"]}));
        migrate_block(TemplateType::HorizontalCard, &mut b, 0);
        assert_eq!(b["items"], json!(["a"]));
        assert_eq!(b["iconNames"], json!(["Star"]));
        assert!(!b.contains_key("bodyText"));
    }

    #[test]
    fn test_square_layout_keeps_body_text() {
        let mut b = block(json!({"bodyText": "본문"}));
        migrate_block(TemplateType::SquareLayout, &mut b, 0);
        assert_eq!(b["bodyText"], json!("본문"));
        assert!(!b.contains_key("items"));
    }

    #[test]
    fn test_copyright_fields_replaced() {
        let mut b = block(json!({"copyrightText": "old", "copyrightUrl": "x.png"}));
        migrate_block(TemplateType::QuadLayout, &mut b, 1);
        assert!(!b.contains_key("copyrightText"));
        assert!(!b.contains_key("copyrightUrl"));
        assert_eq!(
            b["copyrightArea"],
            default_block(TemplateType::QuadLayout)["copyrightArea"]
        );
    }

    #[test]
    fn test_current_version_is_untouched() {
        let mut b = block(json!({"bodyText": "hello", "copyrightText": "old"}));
        assert_eq!(migrate_block(TemplateType::HorizontalCard, &mut b, SCHEMA_VERSION), 0);
        assert_eq!(b, block(json!({"bodyText": "hello", "copyrightText": "old"})));
    }

    #[test]
    fn test_corrections_reach_nested_text() {
        let corrections = ContentCorrections::default();
        let mut b = block(json!({
            "headline1": "양보 없는 전진",
            "items": ["안정 양보 정책"],
            "itemDetails": [["양보", "x"], ["y"]],
            "headlines": [{"text": "양보", "color": "#양보"}],
            "copyrightArea": {"left1": "양보와 양보"},
            "logoUrl": "data:양보",
        }));
        let changed = corrections.apply_block(&mut b);
        assert_eq!(changed, 5);
        assert_eq!(b["headline1"], json!("안보 없는 전진"));
        assert_eq!(b["items"], json!(["안정 안보 정책"]));
        assert_eq!(b["itemDetails"], json!([["안보", "x"], ["y"]]));
        assert_eq!(b["headlines"], json!([{"text": "안보", "color": "#양보"}]));
        assert_eq!(b["copyrightArea"]["left1"], json!("안보와 안보"));
        assert_eq!(b["logoUrl"], json!("data:양보"));
    }

    #[test]
    fn test_corrections_are_idempotent() {
        let corrections = ContentCorrections::default();
        let mut b = block(json!({"items": ["양보"]}));
        corrections.apply_block(&mut b);
        assert_eq!(corrections.apply_block(&mut b), 0);
    }

    #[test]
    fn test_parse_rules() {
        let c = ContentCorrections::parse(["foo=qux", " a = b "]).unwrap();
        assert_eq!(
            c.rules(),
            &[("foo".to_string(), "qux".to_string()), ("a".to_string(), "b".to_string())]
        );
        assert!(ContentCorrections::parse(["nope"]).is_err());
        assert!(ContentCorrections::parse(["a=aa"]).is_err());
        assert!(ContentCorrections::parse(["=x"]).is_err());
    }

    #[test]
    fn test_chained_rules_are_rejected() {
        assert!(ContentCorrections::parse(["b=c", "a=b"]).is_err());
        assert!(ContentCorrections::parse(["a=b", "b=c"]).is_err());
        assert!(ContentCorrections::parse(["a=b", "c=d"]).is_ok());
    }

    #[test]
    fn test_rewrite_settles_in_one_application() {
        // "abb" -> "ab" -> "a": the first replacement forms a new match
        let c = ContentCorrections::parse(["ab=a"]).unwrap();
        let once = c.apply_str("xabbb").unwrap();
        assert_eq!(once, "xa");
        assert_eq!(c.apply_str(&once), None);
    }
}

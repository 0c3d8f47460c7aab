//! # Reconciliation Tests
//!
//! Load-time behaviour of the editor state: layer precedence, migrations of
//! legacy cached records, content corrections and persistence.

use cardnews::state::{
    ContentCorrections, Editor, FileStore, LocalSnapshot, MemoryStore, SCHEMA_VERSION, Slot, reconcile,
};
use cardnews::template::defaults::{default_block, registry};
use cardnews::template::icons::DEFAULT_ICON_NAMES;
use cardnews::template::{TemplateBlock, TemplateSet, TemplateType};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn block(value: Value) -> TemplateBlock {
    value.as_object().cloned().unwrap()
}

fn snapshot(kind: TemplateType, value: Value) -> LocalSnapshot {
    let mut templates = TemplateSet::new();
    templates.insert(kind, block(value));
    LocalSnapshot::current(templates, Default::default())
}

fn corrections() -> ContentCorrections {
    ContentCorrections::parse(["양보=안보"]).unwrap()
}

#[test]
fn test_local_value_survives_empty_server_value() {
    let local = snapshot(TemplateType::VerticalCard, json!({"headline1": "지역 일꾼"}));
    let mut server = TemplateSet::new();
    server.insert(TemplateType::VerticalCard, block(json!({"headline1": ""})));

    let out = reconcile(registry(), Some(&local), Some(&server), &ContentCorrections::none());
    assert_eq!(out[&TemplateType::VerticalCard]["headline1"], json!("지역 일꾼"));
}

#[test]
fn test_non_empty_server_value_wins() {
    let local = snapshot(TemplateType::VerticalCard, json!({"headline1": "지역 일꾼"}));
    let mut server = TemplateSet::new();
    server.insert(TemplateType::VerticalCard, block(json!({"headline1": "공식 문구"})));

    let out = reconcile(registry(), Some(&local), Some(&server), &ContentCorrections::none());
    assert_eq!(out[&TemplateType::VerticalCard]["headline1"], json!("공식 문구"));
}

#[test]
fn test_empty_everywhere_gives_code_default() {
    let local = snapshot(TemplateType::SquareLayout, json!({"headline1": ""}));
    let mut server = TemplateSet::new();
    server.insert(TemplateType::SquareLayout, block(json!({"headline1": "  "})));

    let out = reconcile(registry(), Some(&local), Some(&server), &ContentCorrections::none());
    assert_eq!(
        out[&TemplateType::SquareLayout]["headline1"],
        default_block(TemplateType::SquareLayout)["headline1"]
    );
}

#[test]
fn test_reconcile_is_idempotent() {
    let local = snapshot(
        TemplateType::HorizontalCard,
        json!({"items": ["안정 양보 정책"], "logoUrl": ""}),
    );
    let first = reconcile(registry(), Some(&local), None, &corrections());
    let again = reconcile(
        registry(),
        Some(&LocalSnapshot::current(first.clone(), Default::default())),
        None,
        &corrections(),
    );
    assert_eq!(first, again);
}

#[test]
fn test_banned_word_is_corrected_and_persisted() {
    let legacy = json!({"horizontal-card": {"items": ["안정 양보 정책"]}});
    let store = MemoryStore::new().with(Slot::TemplateData, legacy.to_string());
    let editor = Editor::load(store, corrections());

    assert_eq!(
        editor.block(TemplateType::HorizontalCard)["items"],
        json!(["안정 안보 정책"])
    );
    let persisted = editor.store().get(Slot::TemplateData).unwrap();
    assert!(persisted.contains("안정 안보 정책"));
    assert!(!persisted.contains("양보"));
}

#[test]
fn test_legacy_body_text_becomes_items() {
    let legacy = json!({"horizontal-card": {"bodyText": "hello"}});
    let store = MemoryStore::new().with(Slot::TemplateData, legacy.to_string());
    let editor = Editor::load(store, ContentCorrections::none());

    let block = editor.block(TemplateType::HorizontalCard);
    assert_eq!(block["items"], json!(["hello"]));
    assert_eq!(block["iconNames"], json!(DEFAULT_ICON_NAMES));
    assert!(!block.contains_key("bodyText"));
}

#[test]
fn test_persisted_envelope_carries_current_version() {
    let legacy = json!({"vertical-card": {"headline1": "옛 문구"}});
    let store = MemoryStore::new().with(Slot::TemplateData, legacy.to_string());
    let editor = Editor::load(store, ContentCorrections::none());

    let saved = LocalSnapshot::parse(editor.store().get(Slot::TemplateData).unwrap()).unwrap();
    assert_eq!(saved.version, SCHEMA_VERSION);
    assert_eq!(saved.templates[&TemplateType::VerticalCard]["headline1"], json!("옛 문구"));
}

#[test]
fn test_file_store_edits_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut editor = Editor::load(FileStore::open(dir.path()).unwrap(), ContentCorrections::none());
        editor.select_template(TemplateType::VerticalCard);
        editor.set_field("bgColor", json!("#112233")).unwrap();
        editor.clear_field("headline2").unwrap();
    }

    let editor = Editor::load(FileStore::open(dir.path()).unwrap(), ContentCorrections::none());
    assert_eq!(editor.selected(), TemplateType::VerticalCard);
    let block = editor.block(TemplateType::VerticalCard);
    assert_eq!(block["bgColor"], json!("#112233"));
    assert_eq!(block["headline2"], json!(""));
}

#[test]
fn test_self_forming_correction_settles_on_first_load() {
    let corrections = ContentCorrections::parse(["ab=a"]).unwrap();
    let local = snapshot(TemplateType::VerticalCard, json!({"headline1": "xabbb"}));
    let first = reconcile(registry(), Some(&local), None, &corrections);
    assert_eq!(first[&TemplateType::VerticalCard]["headline1"], json!("xa"));

    let again = reconcile(
        registry(),
        Some(&LocalSnapshot::current(first.clone(), Default::default())),
        None,
        &corrections,
    );
    assert_eq!(first, again);
}

//! # Editor State Controller
//!
//! [`Editor`] owns the whole application state: every template's record, the
//! selected template, app title/subtitle, saved snapshots and the explicit
//! "cleared" markers. State only changes through its methods, and each method
//! persists the slots it touched before returning.
//!
//! Persistence failures are logged and otherwise ignored: the in-memory state
//! stays authoritative for the rest of the session.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::error::{CardNewsError, Result};
use crate::template::defaults::{default_block, default_copyright_area, registry};
use crate::template::{CopyrightArea, TemplateBlock, TemplateData, TemplateSet, TemplateType};

use super::empty::{empty_like, is_empty};
use super::migrate::{ContentCorrections, migrate_block};
use super::reconcile::{ClearedFields, LocalSnapshot, reconcile};
use super::saved::{AppDefaults, SavedContent, parse_saved_contents};
use super::store::{LocalStore, Slot};

pub const DEFAULT_APP_TITLE: &str = "정치 홍보물 디자인 도구";
pub const DEFAULT_APP_SUBTITLE: &str = "선거 홍보 카드뉴스 제작";

/// Partial update of the copyright area; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyrightPatch {
    pub left1: Option<String>,
    pub left2: Option<String>,
    pub center_name: Option<String>,
    pub right1: Option<String>,
    pub right2: Option<String>,
    pub right3: Option<String>,
    pub highlight_word: Option<String>,
    pub highlight_word2: Option<String>,
}

impl CopyrightPatch {
    fn apply(&self, area: &mut CopyrightArea) {
        let fields = [
            (&self.left1, &mut area.left1),
            (&self.left2, &mut area.left2),
            (&self.center_name, &mut area.center_name),
            (&self.right1, &mut area.right1),
            (&self.right2, &mut area.right2),
            (&self.right3, &mut area.right3),
            (&self.highlight_word, &mut area.highlight_word),
        ];
        for (patch, target) in fields {
            if let Some(value) = patch {
                *target = value.clone();
            }
        }
        if let Some(value) = &self.highlight_word2 {
            area.highlight_word2 = Some(value.clone());
        }
    }
}

/// Application state controller.
pub struct Editor<S: LocalStore> {
    store: S,
    corrections: ContentCorrections,
    templates: TemplateSet,
    cleared: ClearedFields,
    selected: TemplateType,
    app_title: String,
    app_subtitle: String,
    saved_contents: Vec<SavedContent>,
}

impl<S: LocalStore> Editor<S> {
    /// Load state from `store`, reconciling the cached record against the
    /// code defaults and writing the result straight back.
    pub fn load(store: S, corrections: ContentCorrections) -> Self {
        let local = match store.read(Slot::TemplateData) {
            Ok(Some(json)) => match LocalSnapshot::parse(&json) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!(error = %e, "cached template data is corrupt, using defaults");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read cached template data");
                None
            }
        };

        let templates = reconcile(registry(), local.as_ref(), None, &corrections);
        let cleared = local.map(|s| s.cleared).unwrap_or_default();

        let selected = read_slot(&store, Slot::SelectedTemplate)
            .and_then(|s| TemplateType::parse(s.trim()))
            .unwrap_or_default();
        let app_title = read_slot(&store, Slot::AppTitle)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_APP_TITLE.to_string());
        let app_subtitle = read_slot(&store, Slot::AppSubtitle)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_APP_SUBTITLE.to_string());
        let saved_contents = read_slot(&store, Slot::SavedContents)
            .map(|json| {
                parse_saved_contents(&json).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "discarding unreadable saved contents");
                    Vec::new()
                })
            })
            .unwrap_or_default();

        let mut editor = Self {
            store,
            corrections,
            templates,
            cleared,
            selected,
            app_title,
            app_subtitle,
            saved_contents,
        };
        editor.persist_templates();
        editor
    }

    /// Merge defaults fetched from the backend into the current state.
    ///
    /// Server values override only where they are non-empty. A non-blank
    /// title, any subtitle and a known template id are taken as-is.
    pub fn apply_server_defaults(&mut self, defaults: &AppDefaults) {
        if let Some(server) = defaults.templates() {
            let local = LocalSnapshot::current(self.templates.clone(), self.cleared.clone());
            self.templates = reconcile(registry(), Some(&local), Some(&server), &self.corrections);
            self.persist_templates();
        }
        if let Some(title) = &defaults.app_title
            && !title.trim().is_empty()
        {
            self.set_title(title.trim());
        }
        if let Some(subtitle) = &defaults.app_subtitle {
            self.set_subtitle(subtitle);
        }
        if let Some(kind) = defaults.selected() {
            self.select_template(kind);
        }
    }

    /// Payload for saving the current state as the app-wide defaults.
    pub fn to_app_defaults(&self) -> AppDefaults {
        let template_data = match serde_json::to_value(&self.templates) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        };
        AppDefaults {
            template_data,
            app_title: Some(self.app_title.clone()),
            app_subtitle: Some(self.app_subtitle.clone()),
            selected_template: Some(self.selected.id().to_string()),
        }
    }

    pub fn selected(&self) -> TemplateType {
        self.selected
    }

    pub fn select_template(&mut self, kind: TemplateType) {
        self.selected = kind;
        self.persist(Slot::SelectedTemplate, kind.id().to_string());
    }

    pub fn title(&self) -> &str {
        &self.app_title
    }

    pub fn subtitle(&self) -> &str {
        &self.app_subtitle
    }

    pub fn set_title(&mut self, title: &str) {
        self.app_title = title.to_string();
        self.persist(Slot::AppTitle, self.app_title.clone());
    }

    pub fn set_subtitle(&mut self, subtitle: &str) {
        self.app_subtitle = subtitle.to_string();
        self.persist(Slot::AppSubtitle, self.app_subtitle.clone());
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    pub fn cleared(&self, kind: TemplateType) -> Option<&BTreeSet<String>> {
        self.cleared.get(&kind)
    }

    /// Current block of `kind`, with code defaults filling missing fields.
    pub fn block(&self, kind: TemplateType) -> TemplateBlock {
        let mut block = default_block(kind).clone();
        if let Some(current) = self.templates.get(&kind) {
            for (field, value) in current {
                block.insert(field.clone(), value.clone());
            }
        }
        block
    }

    /// Typed record of `kind`.
    pub fn data(&self, kind: TemplateType) -> Result<TemplateData> {
        TemplateData::from_block(kind, &self.block(kind))
    }

    /// Typed record of the selected template.
    pub fn form_data(&self) -> Result<TemplateData> {
        self.data(self.selected)
    }

    /// Set one field of the selected template.
    ///
    /// The updated record must still validate; otherwise nothing changes.
    /// Setting an empty value marks the field as explicitly cleared.
    pub fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
        let field = field.trim();
        if field.is_empty() {
            return Err(CardNewsError::Validation("field name is empty".into()));
        }
        let kind = self.selected;
        if !kind.has_field(field) {
            return Err(CardNewsError::Validation(format!("{} has no field '{}'", kind, field)));
        }
        let mut block = self.block(kind);
        let cleared = is_empty(Some(&value));
        block.insert(field.to_string(), value);
        TemplateData::from_block(kind, &block)
            .map_err(|e| CardNewsError::Validation(format!("{}: {}", field, e)))?;

        let markers = self.cleared.entry(kind).or_default();
        if cleared {
            markers.insert(field.to_string());
        } else {
            markers.remove(field);
        }
        if markers.is_empty() {
            self.cleared.remove(&kind);
        }

        self.templates.insert(kind, block);
        self.persist_templates();
        Ok(())
    }

    /// Clear a field of the selected template, keeping its JSON kind.
    pub fn clear_field(&mut self, field: &str) -> Result<()> {
        let current = self.block(self.selected);
        let empty = empty_like(current.get(field).or_else(|| default_block(self.selected).get(field)));
        self.set_field(field, empty)
    }

    /// Update the copyright area of every template at once.
    pub fn set_copyright(&mut self, patch: &CopyrightPatch) -> Result<()> {
        let mut updated = TemplateSet::new();
        for kind in TemplateType::ALL {
            let mut block = self.block(kind);
            let mut area: CopyrightArea = match block.get("copyrightArea") {
                Some(v) if !v.is_null() => serde_json::from_value(v.clone())
                    .map_err(|e| CardNewsError::Schema(format!("{}: copyrightArea: {}", kind, e)))?,
                _ => default_copyright_area(),
            };
            patch.apply(&mut area);
            block.insert("copyrightArea".into(), serde_json::to_value(&area)?);
            updated.insert(kind, block);
        }
        self.templates = updated;
        self.persist_templates();
        Ok(())
    }

    pub fn saved_contents(&self) -> &[SavedContent] {
        &self.saved_contents
    }

    /// Snapshot the selected template under `title`.
    pub fn save_content(&mut self, title: &str) -> SavedContent {
        let content = SavedContent::new(self.selected, self.block(self.selected), title);
        self.saved_contents.push(content.clone());
        self.persist_saved_contents();
        content
    }

    /// Delete a snapshot. Returns whether it existed.
    pub fn delete_content(&mut self, id: &str) -> bool {
        let before = self.saved_contents.len();
        self.saved_contents.retain(|c| c.id != id);
        let removed = self.saved_contents.len() != before;
        if removed {
            self.persist_saved_contents();
        }
        removed
    }

    /// Restore a snapshot: select its template and overlay its fields.
    pub fn load_content(&mut self, id: &str) -> Result<()> {
        let content = self
            .saved_contents
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| CardNewsError::Validation(format!("no saved content '{}'", id)))?;
        self.load_snapshot(content.template_type, &content.data)
    }

    /// Overlay `data` onto the record of `kind` and select it.
    ///
    /// Used for saved snapshots and for the metadata of saved card images.
    /// Fields absent from `data` keep their current values. A legacy
    /// horizontal-card `bodyText` only fills `items` when `data` has no
    /// `items` of its own, even an empty list.
    pub fn load_snapshot(&mut self, kind: TemplateType, data: &TemplateBlock) -> Result<()> {
        let mut incoming: TemplateBlock = data
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if kind == TemplateType::HorizontalCard
            && let Some(body) = incoming.remove("bodyText")
            && !incoming.contains_key("items")
            && body.as_str().is_some_and(|text| !text.is_empty())
        {
            incoming.insert("items".into(), Value::Array(vec![body]));
        }

        let mut block = self.block(kind);
        block.extend(incoming);
        migrate_block(kind, &mut block, 0);
        TemplateData::from_block(kind, &block)?;

        self.templates.insert(kind, block);
        self.cleared.remove(&kind);
        self.persist_templates();
        self.select_template(kind);
        Ok(())
    }

    /// Remember the current record as this profile's personal default.
    pub fn save_as_user_default(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.templates)?;
        self.store.write(Slot::UserDefaultTemplateData, &json)
    }

    /// Overwrite every record with the personal default, or with the code
    /// defaults when none was saved.
    pub fn reset_to_defaults(&mut self) {
        let user_default = read_slot(&self.store, Slot::UserDefaultTemplateData).and_then(|json| {
            LocalSnapshot::parse(&json)
                .map_err(|e| tracing::warn!(error = %e, "ignoring unreadable personal default"))
                .ok()
        });
        self.templates = reconcile(registry(), user_default.as_ref(), None, &self.corrections);
        self.cleared.clear();
        self.persist_templates();
    }

    pub fn access_token(&self) -> Option<String> {
        read_slot(&self.store, Slot::AccessToken).filter(|t| !t.is_empty())
    }

    pub fn set_access_token(&mut self, token: Option<&str>) {
        let result = match token {
            Some(t) => self.store.write(Slot::AccessToken, t),
            None => self.store.remove(Slot::AccessToken),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist access token");
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist_templates(&mut self) {
        let snapshot = LocalSnapshot::current(self.templates.clone(), self.cleared.clone());
        match snapshot.to_json() {
            Ok(json) => self.persist(Slot::TemplateData, json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize template data"),
        }
    }

    fn persist_saved_contents(&mut self) {
        match serde_json::to_string(&self.saved_contents) {
            Ok(json) => self.persist(Slot::SavedContents, json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize saved contents"),
        }
    }

    fn persist(&mut self, slot: Slot, value: String) {
        if let Err(e) = self.store.write(slot, &value) {
            tracing::warn!(slot = slot.key(), error = %e, "failed to persist slot");
        }
    }
}

fn read_slot<S: LocalStore>(store: &S, slot: Slot) -> Option<String> {
    store
        .read(slot)
        .map_err(|e| tracing::warn!(slot = slot.key(), error = %e, "failed to read slot"))
        .ok()
        .flatten()
}

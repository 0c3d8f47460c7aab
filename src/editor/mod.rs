//! # Form Editing Helpers
//!
//! Convenience mutators mirroring the editor's form panels. Each one reads
//! the current value from the selected template, edits a copy and hands the
//! result to [`Editor::set_field`], so validation and persistence happen in
//! one place.

pub mod upload;

use serde_json::{Value, json};

use crate::error::{CardNewsError, Result};
use crate::state::{Editor, LocalStore};
use crate::template::Headline;
use crate::template::icons::is_known_icon;

pub use upload::{MAX_UPLOAD_BYTES, Upload, decode_data_url};

impl<S: LocalStore> Editor<S> {
    fn string_list(&self, field: &str) -> Result<Vec<String>> {
        match self.block(self.selected()).get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                CardNewsError::Validation(format!("{} is not a list of strings: {}", field, e))
            }),
        }
    }

    /// Set `field[index]`, padding the list with empty strings if needed.
    pub fn set_list_item(&mut self, field: &str, index: usize, text: &str) -> Result<()> {
        let mut list = self.string_list(field)?;
        if list.len() <= index {
            list.resize(index + 1, String::new());
        }
        list[index] = text.to_string();
        self.set_field(field, json!(list))
    }

    pub fn push_list_item(&mut self, field: &str, text: &str) -> Result<()> {
        let mut list = self.string_list(field)?;
        list.push(text.to_string());
        self.set_field(field, json!(list))
    }

    pub fn remove_list_item(&mut self, field: &str, index: usize) -> Result<()> {
        let mut list = self.string_list(field)?;
        if index >= list.len() {
            return Err(CardNewsError::Validation(format!(
                "{} has no item {}",
                field, index
            )));
        }
        list.remove(index);
        self.set_field(field, json!(list))
    }

    /// Set one cell of the quad layout's `itemDetails` table.
    pub fn set_detail_cell(&mut self, item: usize, cell: usize, text: &str) -> Result<()> {
        let mut table: Vec<Vec<String>> = match self.block(self.selected()).get("itemDetails") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                CardNewsError::Validation(format!("itemDetails is not a table: {}", e))
            })?,
        };
        if table.len() <= item {
            table.resize(item + 1, Vec::new());
        }
        let row = &mut table[item];
        if row.len() <= cell {
            row.resize(cell + 1, String::new());
        }
        row[cell] = text.to_string();
        self.set_field("itemDetails", json!(table))
    }

    /// Set the icon tag shown next to item `index`.
    pub fn set_icon(&mut self, index: usize, name: &str) -> Result<()> {
        if !is_known_icon(name) {
            return Err(CardNewsError::Validation(format!("unknown icon '{}'", name)));
        }
        self.set_list_item("iconNames", index, name)
    }

    pub fn set_headline_text(&mut self, index: usize, text: &str) -> Result<()> {
        self.edit_headline(index, |h| h.text = text.to_string())
    }

    pub fn set_headline_color(&mut self, index: usize, color: &str) -> Result<()> {
        if crate::render::color::parse_hex(color).is_none() {
            return Err(CardNewsError::Validation(format!("invalid color '{}'", color)));
        }
        self.edit_headline(index, |h| h.color = color.to_string())
    }

    fn edit_headline(&mut self, index: usize, edit: impl FnOnce(&mut Headline)) -> Result<()> {
        let mut headlines: Vec<Headline> = match self.block(self.selected()).get("headlines") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                CardNewsError::Validation(format!("headlines: {}", e))
            })?,
        };
        if headlines.len() <= index {
            headlines.resize(
                index + 1,
                Headline {
                    text: String::new(),
                    color: "#FFFFFF".into(),
                },
            );
        }
        edit(&mut headlines[index]);
        self.set_field("headlines", serde_json::to_value(&headlines)?)
    }

    /// Put an accepted upload into an image field as a data-URL.
    pub fn set_image(&mut self, field: &str, upload: &Upload) -> Result<()> {
        self.set_field(field, Value::String(upload.to_data_url()))
    }
}

#[cfg(test)]
mod tests {
    use crate::state::{ContentCorrections, Editor, MemoryStore};
    use crate::template::TemplateType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn editor(kind: TemplateType) -> Editor<MemoryStore> {
        let mut editor = Editor::load(MemoryStore::new(), ContentCorrections::none());
        editor.select_template(kind);
        editor
    }

    #[test]
    fn test_list_item_helpers() {
        let mut e = editor(TemplateType::VerticalCard);
        e.set_list_item("bodyTexts", 0, "첫째").unwrap();
        e.set_list_item("bodyTexts", 4, "다섯째").unwrap();
        let list = e.block(TemplateType::VerticalCard)["bodyTexts"].clone();
        assert_eq!(list, json!(["첫째", "정책 2", "정책 3", "", "다섯째"]));

        e.remove_list_item("bodyTexts", 3).unwrap();
        e.push_list_item("bodyTexts", "끝").unwrap();
        assert_eq!(
            e.block(TemplateType::VerticalCard)["bodyTexts"],
            json!(["첫째", "정책 2", "정책 3", "다섯째", "끝"])
        );
        assert!(e.remove_list_item("bodyTexts", 9).is_err());
    }

    #[test]
    fn test_list_helper_rejects_non_list_field() {
        let mut e = editor(TemplateType::VerticalCard);
        assert!(e.set_list_item("headline1", 0, "x").is_err());
    }

    #[test]
    fn test_detail_cell() {
        let mut e = editor(TemplateType::QuadLayout);
        e.set_detail_cell(1, 2, "세 번째").unwrap();
        let table = e.block(TemplateType::QuadLayout)["itemDetails"].clone();
        assert_eq!(table[1][2], json!("세 번째"));
        assert_eq!(table[1][0], json!("푸드테크 혁신 클러스터"));
    }

    #[test]
    fn test_icon_must_be_known() {
        let mut e = editor(TemplateType::HorizontalCard);
        e.set_icon(0, "Heart").unwrap();
        assert_eq!(e.block(TemplateType::HorizontalCard)["iconNames"][0], json!("Heart"));
        assert!(e.set_icon(0, "Rocket").is_err());
    }

    #[test]
    fn test_headline_edits() {
        let mut e = editor(TemplateType::VerticalListCard);
        e.set_headline_text(0, "새 헤드라인").unwrap();
        e.set_headline_color(1, "#FF0000").unwrap();
        e.set_headline_text(2, "셋째 줄").unwrap();
        let headlines = e.block(TemplateType::VerticalListCard)["headlines"].clone();
        assert_eq!(headlines[0]["text"], json!("새 헤드라인"));
        assert_eq!(headlines[1]["color"], json!("#FF0000"));
        assert_eq!(headlines[2], json!({"text": "셋째 줄", "color": "#FFFFFF"}));
        assert!(e.set_headline_color(0, "red").is_err());
    }
}

//! # Local Persistence
//!
//! A handful of named string slots, the editor-side equivalent of browser
//! local storage. Writes are synchronous and last-write-wins.
//!
//! - [`FileStore`]: one file per slot inside a directory.
//! - [`MemoryStore`]: a map, for tests and one-shot runs.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CardNewsError, Result};

/// Named persistence slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Reconciled template record (versioned envelope).
    TemplateData,
    /// Record saved with "save as my default".
    UserDefaultTemplateData,
    SelectedTemplate,
    AppTitle,
    AppSubtitle,
    /// List of saved content snapshots.
    SavedContents,
    AccessToken,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::TemplateData,
        Slot::UserDefaultTemplateData,
        Slot::SelectedTemplate,
        Slot::AppTitle,
        Slot::AppSubtitle,
        Slot::SavedContents,
        Slot::AccessToken,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Slot::TemplateData => "cardnews-template-data",
            Slot::UserDefaultTemplateData => "cardnews-user-default-template-data",
            Slot::SelectedTemplate => "cardnews-selected-template",
            Slot::AppTitle => "cardnews-app-title",
            Slot::AppSubtitle => "cardnews-app-subtitle",
            Slot::SavedContents => "cardnews-saved-contents",
            Slot::AccessToken => "accessToken",
        }
    }
}

/// Slot-based key/value persistence.
pub trait LocalStore {
    fn read(&self, slot: Slot) -> Result<Option<String>>;
    fn write(&mut self, slot: Slot, value: &str) -> Result<()>;
    fn remove(&mut self, slot: Slot) -> Result<()>;
}

/// Directory-backed store: `<dir>/<slot key>`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            CardNewsError::Storage(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, slot: Slot) -> PathBuf {
        self.dir.join(slot.key())
    }
}

impl LocalStore for FileStore {
    fn read(&self, slot: Slot) -> Result<Option<String>> {
        match fs::read_to_string(self.path(slot)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CardNewsError::Storage(format!("read {}: {}", slot.key(), e))),
        }
    }

    fn write(&mut self, slot: Slot, value: &str) -> Result<()> {
        // Write-then-rename so a crash never leaves a half-written slot.
        let tmp = self.dir.join(format!(".{}.tmp", slot.key()));
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, self.path(slot)))
            .map_err(|e| CardNewsError::Storage(format!("write {}: {}", slot.key(), e)))
    }

    fn remove(&mut self, slot: Slot) -> Result<()> {
        match fs::remove_file(self.path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CardNewsError::Storage(format!("remove {}: {}", slot.key(), e))),
        }
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<Slot, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, like a full storage quota.
    pub fn read_only(slots: HashMap<Slot, String>) -> Self {
        Self {
            slots,
            read_only: true,
        }
    }

    pub fn with(mut self, slot: Slot, value: impl Into<String>) -> Self {
        self.slots.insert(slot, value.into());
        self
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }
}

impl LocalStore for MemoryStore {
    fn read(&self, slot: Slot) -> Result<Option<String>> {
        Ok(self.slots.get(&slot).cloned())
    }

    fn write(&mut self, slot: Slot, value: &str) -> Result<()> {
        if self.read_only {
            return Err(CardNewsError::Storage(format!(
                "quota exceeded writing {}",
                slot.key()
            )));
        }
        self.slots.insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&mut self, slot: Slot) -> Result<()> {
        if self.read_only {
            return Err(CardNewsError::Storage("store is read-only".into()));
        }
        self.slots.remove(&slot);
        Ok(())
    }
}

//! # Editor State
//!
//! Everything between the template registry and the outside world: local
//! persistence slots, schema migrations, reconciliation of defaults with
//! cached and server records, and the [`Editor`] controller that owns the
//! result.

pub mod controller;
pub mod empty;
pub mod migrate;
pub mod reconcile;
pub mod saved;
pub mod store;

pub use controller::{CopyrightPatch, DEFAULT_APP_SUBTITLE, DEFAULT_APP_TITLE, Editor};
pub use migrate::{ContentCorrections, SCHEMA_VERSION};
pub use reconcile::{ClearedFields, LocalSnapshot, reconcile};
pub use saved::{AppDefaults, SavedContent};
pub use store::{FileStore, LocalStore, MemoryStore, Slot};

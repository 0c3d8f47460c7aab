//! # Cardnews - Card-news Graphic Editor Library
//!
//! Cardnews edits campaign "card news" graphics built from five fixed
//! templates and exports them as PNGs. It provides:
//!
//! - **Template registry**: typed records and code defaults per layout
//! - **State reconciliation**: defaults, the local cache and server defaults
//!   merged with versioned migrations and content corrections
//! - **Form editing**: typed mutators over the selected template's record
//! - **Rendering**: one renderer per layout, rasterized to PNG
//! - **Backend**: axum handlers for sessions, defaults, images and saved
//!   content, plus a matching HTTP client
//!
//! ## Quick Start
//!
//! ```no_run
//! use cardnews::{
//!     render::{RenderContext, export, font::FontBook, images::ImageSet},
//!     state::{ContentCorrections, Editor, FileStore},
//! };
//! use serde_json::json;
//!
//! let store = FileStore::open("./cardnews-store")?;
//! let mut editor = Editor::load(store, ContentCorrections::none());
//! editor.set_field("headline1", json!("새로운 시작"))?;
//!
//! let data = editor.form_data()?;
//! let fonts = FontBook::bitmap();
//! let mut images = ImageSet::new();
//! images.load_local(&data);
//! let out = export(&data, &RenderContext::new(&fonts, &images), 2.0)?;
//! std::fs::write(&out.filename, &out.png)?;
//!
//! # Ok::<(), cardnews::error::CardNewsError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Template types, records and defaults |
//! | [`state`] | Local slots, migrations, reconciliation, the editor controller |
//! | [`editor`] | List, icon, headline and image mutators; upload checks |
//! | [`render`] | Canvas, text, images and the per-layout renderers |
//! | [`server`] | HTTP backend |
//! | [`client`] | Backend client |
//! | [`error`] | Error types |

pub mod client;
pub mod editor;
pub mod error;
pub mod render;
pub mod server;
pub mod state;
pub mod template;

// Re-exports for convenience
pub use error::CardNewsError;
pub use state::Editor;
pub use template::{TemplateData, TemplateType};

//! HTTP handlers for the server.

pub mod blobs;
pub mod contents;
pub mod defaults;
pub mod images;
pub mod render;
pub mod session;

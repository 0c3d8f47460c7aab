//! # Card-news Backend
//!
//! JSON API for sessions, shared app defaults, uploaded images, saved
//! card-news PNGs and saved content snapshots.
//!
//! ## Usage
//!
//! ```bash
//! cardnews serve --listen 0.0.0.0:8080 --data-dir ./data \
//!     --jwt-secret "$SECRET" --user "21t:$(cardnews hash-password 21t)"
//! ```
//!
//! Handlers that change anything require `Authorization: Bearer <token>`
//! from `POST /login`, unless the server runs with `--dev-mode`.

pub mod auth;
pub mod error;
mod handlers;
pub mod models;
pub mod state;
pub mod storage;

pub use error::{ApiError, ApiResult};
pub use models::ImageKind;
pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{delete, get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::{CardNewsError, Result};
use crate::render::font::FontBook;

/// Request bodies carry base64 images; allow well past the 5 MB upload limit.
const BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Build the router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(handlers::session::health))
        .route("/login", post(handlers::session::login))
        .route("/verify-session", post(handlers::session::verify_session))
        .route(
            "/app-defaults",
            get(handlers::defaults::get).post(handlers::defaults::set),
        )
        .route(
            "/saved-contents",
            get(handlers::contents::list).post(handlers::contents::create),
        )
        .route("/saved-contents/:id", delete(handlers::contents::delete))
        .route("/render", post(handlers::render::render))
        .route("/blobs/:filename", get(handlers::blobs::fetch))
        .merge(handlers::images::routes())
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use cardnews::render::font::FontBook;
/// use cardnews::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), cardnews::error::CardNewsError> {
/// let config = ServerConfig {
///     dev_mode: true,
///     ..ServerConfig::default()
/// };
///
/// serve(config, FontBook::bitmap()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig, fonts: FontBook) -> Result<()> {
    let listen_addr = config.listen_addr.clone();
    let state = Arc::new(AppState::new(config, fonts).await?);

    tracing::info!(
        listen = %listen_addr,
        data_dir = ?state.config.data_dir,
        public_url = %state.config.public_url,
        users = state.accounts.len(),
        dev_mode = state.config.dev_mode,
        "cardnews server starting"
    );
    if state.config.dev_mode {
        tracing::warn!("dev mode: authentication disabled");
    }

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| CardNewsError::Transport(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    axum::serve(listener, router(state))
        .await
        .map_err(|e| CardNewsError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

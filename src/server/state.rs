//! Server state and configuration.

use std::path::PathBuf;
use std::sync::Arc;

use super::auth::{Accounts, JwtConfig};
use super::storage::{BlobStore, FileBlobs, FileKv, KvStore, MemoryBlobs, MemoryKv, UrlSigner};
use crate::error::{CardNewsError, Result};
use crate::render::font::FontBook;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Where records and blobs are kept; in memory when unset.
    pub data_dir: Option<PathBuf>,
    /// Externally reachable base URL, used in signed blob URLs.
    pub public_url: String,
    pub jwt_secret: String,
    pub token_ttl_mins: i64,
    pub url_ttl_secs: i64,
    /// `login:argon2-hash` entries.
    pub users: Vec<String>,
    /// Skip authentication and treat every request as the dev user.
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            data_dir: None,
            public_url: "http://127.0.0.1:8080".to_string(),
            jwt_secret: String::new(),
            token_ttl_mins: 60 * 24,
            url_ttl_secs: 60 * 60 * 24 * 365,
            users: Vec::new(),
            dev_mode: false,
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub kv: Arc<dyn KvStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub jwt: JwtConfig,
    pub accounts: Accounts,
    pub signer: UrlSigner,
    pub fonts: Arc<FontBook>,
}

impl AppState {
    /// Open file-backed stores under `data_dir`, or in-memory ones without it.
    pub async fn new(config: ServerConfig, fonts: FontBook) -> Result<Self> {
        let (kv, blobs): (Arc<dyn KvStore>, Arc<dyn BlobStore>) = match &config.data_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                (
                    Arc::new(FileKv::open(dir.join("records.json")).await?),
                    Arc::new(FileBlobs::open(dir.join("blobs")).await?),
                )
            }
            None => (Arc::new(MemoryKv::new()), Arc::new(MemoryBlobs::new())),
        };
        Self::with_stores(config, kv, blobs, fonts)
    }

    pub fn with_stores(
        config: ServerConfig,
        kv: Arc<dyn KvStore>,
        blobs: Arc<dyn BlobStore>,
        fonts: FontBook,
    ) -> Result<Self> {
        if config.jwt_secret.is_empty() && !config.dev_mode {
            return Err(CardNewsError::Config("a JWT secret is required outside dev mode".into()));
        }
        let accounts = Accounts::parse(&config.users)?;
        let jwt = JwtConfig {
            secret: config.jwt_secret.clone(),
            token_ttl_mins: config.token_ttl_mins,
        };
        let signer = UrlSigner::new(&config.jwt_secret, &config.public_url, config.url_ttl_secs);
        Ok(Self {
            config,
            kv,
            blobs,
            jwt,
            accounts,
            signer,
            fonts: Arc::new(fonts),
        })
    }

    /// In-memory state, for tests.
    pub fn in_memory(config: ServerConfig) -> Result<Self> {
        Self::with_stores(
            config,
            Arc::new(MemoryKv::new()),
            Arc::new(MemoryBlobs::new()),
            FontBook::bitmap(),
        )
    }
}

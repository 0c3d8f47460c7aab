//! Key-value records and binary blobs behind the HTTP handlers.
//!
//! Both stores come in an in-memory flavour (tests, `--data-dir` unset) and a
//! file-backed one. Blob URLs handed to clients are signed with HMAC-SHA256
//! and expire after a configurable lifetime.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::{CardNewsError, Result};

/// JSON records addressed by `prefix:id` keys.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
    async fn del(&self, key: &str) -> Result<()>;
    /// Every record whose key starts with `prefix`, in key order.
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>>;
}

/// Binary objects addressed by filename.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> Result<()>;
    async fn get(&self, filename: &str) -> Result<Option<Vec<u8>>>;
    async fn remove(&self, filename: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryKv {
    records: RwLock<BTreeMap<String, Value>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.records.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
        let records = self.records.read().await;
        Ok(prefix_values(&records, prefix))
    }
}

/// Records kept in one JSON file, rewritten on every change. The in-memory
/// view only changes once the file write has succeeded.
#[derive(Debug)]
pub struct FileKv {
    path: PathBuf,
    records: RwLock<BTreeMap<String, Value>>,
}

impl FileKv {
    /// Open `path`, starting empty when it does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| CardNewsError::Storage(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    async fn flush(&self, records: &BTreeMap<String, Value>) -> Result<()> {
        let text = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KvStore for FileKv {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut records = self.records.write().await;
        let mut next = records.clone();
        next.insert(key.to_string(), value);
        self.flush(&next).await?;
        *records = next;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut records = self.records.write().await;
        if !records.contains_key(key) {
            return Ok(());
        }
        let mut next = records.clone();
        next.remove(key);
        self.flush(&next).await?;
        *records = next;
        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
        let records = self.records.read().await;
        Ok(prefix_values(&records, prefix))
    }
}

fn prefix_values(records: &BTreeMap<String, Value>, prefix: &str) -> Vec<Value> {
    records
        .range(prefix.to_string()..)
        .take_while(|(k, _)| k.starts_with(prefix))
        .map(|(_, v)| v.clone())
        .collect()
}

#[derive(Debug, Default)]
pub struct MemoryBlobs {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> Result<()> {
        self.blobs.write().await.insert(filename.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(filename).cloned())
    }

    async fn remove(&self, filename: &str) -> Result<()> {
        self.blobs.write().await.remove(filename);
        Ok(())
    }
}

/// One file per blob under a directory.
#[derive(Debug)]
pub struct FileBlobs {
    dir: PathBuf,
}

impl FileBlobs {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path(&self, filename: &str) -> Result<PathBuf> {
        if !is_safe_filename(filename) {
            return Err(CardNewsError::Validation(format!("invalid blob name '{}'", filename)));
        }
        Ok(self.dir.join(filename))
    }
}

#[async_trait]
impl BlobStore for FileBlobs {
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> Result<()> {
        tokio::fs::write(self.path(filename)?, bytes).await?;
        Ok(())
    }

    async fn get(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(filename)?).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, filename: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(filename)?).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Blob names are generated server-side; anything else is refused.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && Path::new(name).file_name().is_some_and(|f| f == name)
}

type HmacSha256 = Hmac<Sha256>;

/// Issues and checks `?expires=&sig=` query strings for blob URLs.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: String,
    ttl_secs: i64,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>, base_url: &str, ttl_secs: i64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            base_url: base_url.trim_end_matches('/').to_string(),
            ttl_secs,
        }
    }

    fn signature(&self, filename: &str, expires: i64) -> String {
        // new_from_slice accepts keys of any length for HMAC
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(format!("{}:{}", filename, expires).as_bytes());
        format!("{:x}", mac.finalize().into_bytes())
    }

    /// URL for `filename`, valid for the configured lifetime from `now`.
    pub fn sign(&self, filename: &str, now: i64) -> String {
        let expires = now + self.ttl_secs;
        format!(
            "{}/blobs/{}?expires={}&sig={}",
            self.base_url,
            filename,
            expires,
            self.signature(filename, expires)
        )
    }

    pub fn verify(&self, filename: &str, expires: i64, sig: &str, now: i64) -> bool {
        if expires < now {
            return false;
        }
        let expected = self.signature(filename, expires);
        !expected.is_empty() && constant_time_eq(expected.as_bytes(), sig.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_prefix_listing_stays_in_prefix() {
        let kv = MemoryKv::new();
        kv.set("logo:2", json!(2)).await.unwrap();
        kv.set("logo:1", json!(1)).await.unwrap();
        kv.set("profile:1", json!("p")).await.unwrap();
        kv.set("logoz", json!("other")).await.unwrap();
        assert_eq!(kv.get_by_prefix("logo:").await.unwrap(), vec![json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn test_file_kv_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.json");
        {
            let kv = FileKv::open(&path).await.unwrap();
            kv.set("app:defaults", json!({"appTitle": "t"})).await.unwrap();
            kv.set("gone", json!(1)).await.unwrap();
            kv.del("gone").await.unwrap();
        }
        let kv = FileKv::open(&path).await.unwrap();
        assert_eq!(kv.get("app:defaults").await.unwrap(), Some(json!({"appTitle": "t"})));
        assert_eq!(kv.get("gone").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_kv_failed_write_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.json");
        let kv = FileKv::open(&path).await.unwrap();
        kv.set("keep", json!(1)).await.unwrap();

        // a directory where the temp file goes makes every flush fail
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();
        assert!(kv.set("new", json!(2)).await.is_err());
        assert!(kv.del("keep").await.is_err());

        assert_eq!(kv.get("new").await.unwrap(), None);
        assert_eq!(kv.get("keep").await.unwrap(), Some(json!(1)));
        assert_eq!(kv.get_by_prefix("").await.unwrap(), vec![json!(1)]);
    }

    #[tokio::test]
    async fn test_file_blobs_roundtrip_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FileBlobs::open(dir.path().join("blobs")).await.unwrap();
        blobs.put("logo_1.png", vec![1, 2, 3]).await.unwrap();
        assert_eq!(blobs.get("logo_1.png").await.unwrap(), Some(vec![1, 2, 3]));
        blobs.remove("logo_1.png").await.unwrap();
        blobs.remove("logo_1.png").await.unwrap();
        assert_eq!(blobs.get("logo_1.png").await.unwrap(), None);
        assert!(blobs.get("../kv.json").await.is_err());
    }

    #[test]
    fn test_safe_filenames() {
        assert!(is_safe_filename("cardnews_1700000000000.png"));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("a/b.png"));
        assert!(!is_safe_filename(".hidden"));
        assert!(!is_safe_filename(""));
    }

    #[test]
    fn test_signed_url_verifies_until_expiry() {
        let signer = UrlSigner::new("secret", "http://localhost:8080/", 60);
        let url = signer.sign("logo_1.png", 1000);
        assert!(url.starts_with("http://localhost:8080/blobs/logo_1.png?expires=1060&sig="));
        let sig = url.rsplit("sig=").next().unwrap();
        assert!(signer.verify("logo_1.png", 1060, sig, 1000));
        assert!(signer.verify("logo_1.png", 1060, sig, 1060));
        assert!(!signer.verify("logo_1.png", 1060, sig, 1061));
        assert!(!signer.verify("logo_2.png", 1060, sig, 1000));
        assert!(!signer.verify("logo_1.png", 2000, sig, 1000));
    }
}

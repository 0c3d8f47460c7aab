//! Image upload validation and data-URL encoding.
//!
//! Files are checked here, before anything touches the network: the MIME
//! type must be an image type and the payload at most [`MAX_UPLOAD_BYTES`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

use crate::error::{CardNewsError, Result};

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// A validated image upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Validate raw bytes with a declared MIME type.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let mime = mime.into();
        if !mime.starts_with("image/") {
            return Err(CardNewsError::Validation(format!(
                "{} is not an image ({})",
                name, mime
            )));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(CardNewsError::Validation(format!(
                "{} is {} bytes, the limit is {} bytes",
                name,
                bytes.len(),
                MAX_UPLOAD_BYTES
            )));
        }
        Ok(Self { name, mime, bytes })
    }

    /// Read and validate a file, guessing its MIME type from the extension.
    ///
    /// The size is checked from metadata first so oversized files are never
    /// read into memory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream");
        let len = std::fs::metadata(path)?.len();
        if len > MAX_UPLOAD_BYTES as u64 {
            return Err(CardNewsError::Validation(format!(
                "{} is {} bytes, the limit is {} bytes",
                name, len, MAX_UPLOAD_BYTES
            )));
        }
        let bytes = std::fs::read(path)?;
        Self::new(name, mime, bytes)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Decode a base64 `data:` URL into its MIME type and bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| CardNewsError::Image("not a data URL".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CardNewsError::Image("data URL has no payload".into()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| CardNewsError::Image("data URL is not base64 encoded".into()))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| CardNewsError::Image(format!("invalid base64 in data URL: {}", e)))?;
    Ok((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_rejects_non_image_mime() {
        let err = Upload::new("notes.txt", "text/plain", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, CardNewsError::Validation(_)));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(Upload::new("ok.png", "image/png", vec![0; MAX_UPLOAD_BYTES]).is_ok());
        assert!(Upload::new("big.png", "image/png", vec![0; MAX_UPLOAD_BYTES + 1]).is_err());
    }

    #[test]
    fn test_data_url() {
        let upload = Upload::new("a.png", "image/png", b"hi".to_vec()).unwrap();
        let url = upload.to_data_url();
        assert_eq!(url, "data:image/png;base64,aGk=");
        assert_eq!(decode_data_url(&url).unwrap(), ("image/png".to_string(), b"hi".to_vec()));
        assert!(decode_data_url("https://x/y.png").is_err());
        assert!(decode_data_url("data:image/png,raw").is_err());
    }

    #[test]
    fn test_from_path_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::File::create(&path).unwrap().write_all(b"jpeg").unwrap();
        let upload = Upload::from_path(&path).unwrap();
        assert_eq!(upload.mime, "image/jpeg");
        assert_eq!(upload.name, "photo.jpg");

        let text = dir.path().join("readme.md");
        std::fs::write(&text, "x").unwrap();
        assert!(Upload::from_path(&text).is_err());
    }
}

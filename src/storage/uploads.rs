//! Upload store
//!
//! Uploaded files are kept verbatim under the name the client sent. A second
//! upload with the same name replaces the first.

use super::StoreError;
use crate::config::StorageConfig;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Public URL an uploaded file is served from
pub fn upload_url(filename: &str) -> String {
    format!("/uploads/{}", urlencoding::encode(filename))
}

/// Reduce a client-supplied file name to its final path component
///
/// Browsers normally send a bare name, but some send the full local path.
/// Returns `None` when nothing usable is left.
pub fn sanitize_filename(raw: &str) -> Option<&str> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        None
    } else {
        Some(name)
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(storage: &StorageConfig) -> Self {
        Self {
            dir: storage.upload_dir.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store `data` under the sanitized `filename` and return its URL
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<String, StoreError> {
        let Some(name) = sanitize_filename(filename) else {
            return Err(StoreError::InvalidInput("No selected file".to_string()));
        };

        fs::write(self.dir.join(name), data).await?;
        Ok(upload_url(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo.png"), Some("photo.png"));
        assert_eq!(sanitize_filename("C:\\Users\\me\\photo.png"), Some("photo.png"));
        assert_eq!(sanitize_filename("../../etc/passwd"), Some("passwd"));
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("dir/"), None);
        assert_eq!(sanitize_filename(".."), None);
    }

    #[test]
    fn test_upload_url() {
        assert_eq!(upload_url("photo.png"), "/uploads/photo.png");
        assert_eq!(upload_url("my photo.png"), "/uploads/my%20photo.png");
    }

    #[tokio::test]
    async fn test_second_upload_overwrites_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageConfig::rooted_at(dir.path());
        std::fs::create_dir_all(&storage.upload_dir).expect("mkdir");
        let store = UploadStore::new(&storage);

        let url = store.save("photo.png", b"first").await.expect("save");
        assert_eq!(url, "/uploads/photo.png");
        store.save("photo.png", b"second").await.expect("save again");

        let stored = std::fs::read(store.dir().join("photo.png")).expect("read");
        assert_eq!(stored, b"second");
    }

    #[tokio::test]
    async fn test_empty_filename_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageConfig::rooted_at(dir.path());
        std::fs::create_dir_all(&storage.upload_dir).expect("mkdir");
        let store = UploadStore::new(&storage);

        assert!(matches!(
            store.save("", b"data").await,
            Err(StoreError::InvalidInput(_))
        ));
    }
}

//! Filesystem storage module
//!
//! Articles and uploads live as plain files in two flat directories. The
//! filesystem is the only source of truth: nothing is cached between calls.

pub mod articles;
pub mod uploads;

pub use articles::ArticleStore;
pub use uploads::UploadStore;

use crate::config::StorageConfig;
use hyper::StatusCode;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Failure of a store operation, mapped one-to-one onto an HTTP status
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was missing or empty, or a name is not a plain filename
    #[error("{0}")]
    InvalidInput(String),
    /// The referenced article or file does not exist
    #[error("{0}")]
    NotFound(String),
    /// The underlying file operation failed
    #[error("{0}")]
    Storage(#[from] io::Error),
}

impl StoreError {
    pub fn invalid_data() -> Self {
        Self::InvalidInput("Invalid data".to_string())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Accept `name` only if it is a single, plain path component
///
/// Names reach the stores straight from query strings, so anything that could
/// step outside the storage directory is rejected.
pub fn validate_name(name: &str) -> Result<&str, StoreError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if plain {
        Ok(name)
    } else {
        Err(StoreError::InvalidInput(format!("Invalid name: {name}")))
    }
}

/// Create the upload and article directories if they are missing
pub fn ensure_dirs(storage: &StorageConfig) -> io::Result<()> {
    for dir in [&storage.upload_dir, &storage.article_dir] {
        create_dir(dir)?;
    }
    Ok(())
}

fn create_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("failed to create directory '{}': {e}", dir.display()),
        )
    })
}

/// Whether `path` exists as a regular file
async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Go_Basics.md").is_ok());
        assert!(validate_name("photo.png").is_ok());
        assert!(validate_name("..hidden.md").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name(".").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("../secret.md").is_err());
        assert!(validate_name("nested/article.md").is_err());
        assert!(validate_name("windows\\path.md").is_err());
    }

    #[test]
    fn test_error_status() {
        assert_eq!(StoreError::invalid_data().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            StoreError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::from(io_err);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "denied");
    }

    #[test]
    fn test_ensure_dirs_creates_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageConfig::rooted_at(&dir.path().join("nested"));
        ensure_dirs(&storage).expect("create dirs");
        assert!(storage.upload_dir.is_dir());
        assert!(storage.article_dir.is_dir());
        // Idempotent
        ensure_dirs(&storage).expect("second call");
    }
}

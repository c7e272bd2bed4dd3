//! Article store
//!
//! One Markdown file per article. The file name is the article's only
//! identity: it is derived from the title, and saving a title that maps to an
//! existing file overwrites it.

use super::{is_file, validate_name, StoreError};
use crate::config::StorageConfig;
use crate::logger;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Extension appended to every article file name
pub const ARTICLE_EXTENSION: &str = ".md";

/// Derive an article's file name from its title
///
/// Spaces become underscores and the Markdown extension is appended. Nothing
/// else is touched, so `"Go Basics"` maps to `Go_Basics.md`.
pub fn article_filename(title: &str) -> String {
    format!("{}{ARTICLE_EXTENSION}", title.replace(' ', "_"))
}

fn not_found() -> StoreError {
    StoreError::NotFound("Article not found".to_string())
}

/// File-per-article persistence rooted at the configured article directory
#[derive(Debug, Clone)]
pub struct ArticleStore {
    dir: PathBuf,
}

impl ArticleStore {
    pub fn new(storage: &StorageConfig) -> Self {
        Self {
            dir: storage.article_dir.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        Ok(self.dir.join(validate_name(name)?))
    }

    /// Write `content` under the name derived from `title`
    ///
    /// Returns the derived file name. An existing article with the same name
    /// is overwritten.
    pub async fn save(&self, title: &str, content: &str) -> Result<String, StoreError> {
        if title.is_empty() || content.is_empty() {
            return Err(StoreError::invalid_data());
        }

        let filename = article_filename(title);
        let path = self.path_for(&filename)?;
        fs::write(&path, content).await?;
        Ok(filename)
    }

    /// Read the raw Markdown of an article
    pub async fn read(&self, name: &str) -> Result<String, StoreError> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the content of an existing article
    ///
    /// Never creates a file: a missing article is reported as not found.
    pub async fn update(&self, name: &str, content: &str) -> Result<(), StoreError> {
        if content.is_empty() {
            return Err(StoreError::invalid_data());
        }

        let path = self.path_for(name)?;
        if !is_file(&path).await {
            return Err(not_found());
        }

        fs::write(&path, content).await?;
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        if !is_file(&path).await {
            return Err(not_found());
        }

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Lost a race with another delete
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// All article file names, sorted lexicographically
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => logger::log_warning(&format!(
                    "Skipping article with non UTF-8 file name: {raw:?}"
                )),
            }
        }

        names.sort();
        Ok(names)
    }
}

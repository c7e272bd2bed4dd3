// Application state module
// Holds the loaded configuration and the filesystem-backed stores

use super::types::Config;
use crate::storage::{ArticleStore, UploadStore};

/// Application state shared by every connection
///
/// Nothing here caches articles or uploads; the stores only know where their
/// directories are.
pub struct AppState {
    pub config: Config,
    pub articles: ArticleStore,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            articles: ArticleStore::new(&config.storage),
            uploads: UploadStore::new(&config.storage),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_follows_config() {
        let mut config = Config::load_from("does-not-exist/inkwell").expect("defaults");
        assert!(AppState::new(&config).access_log_enabled());

        config.logging.access_log = false;
        config.storage.article_dir = "posts".into();
        let state = AppState::new(&config);
        assert!(!state.access_log_enabled());
        assert_eq!(state.articles.dir(), std::path::Path::new("posts"));
    }
}

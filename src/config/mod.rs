// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, HealthConfig, HttpConfig, StorageConfig};

/// Default config file, looked up without extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the config file
    /// (optional), then `INKWELL_*` environment variables such as
    /// `INKWELL_SERVER__PORT=9000`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("INKWELL").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5008)?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.article_dir", "articles")?
            .set_default("storage.static_dir", "static")?
            .set_default("storage.index_file", "templates/index.html")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "inkwell")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let cfg = Config::load_from("does-not-exist/inkwell").expect("defaults should load");
        assert_eq!(cfg.server.port, 5008);
        assert_eq!(cfg.storage.article_dir, std::path::PathBuf::from("articles"));
        assert_eq!(cfg.storage.upload_dir, std::path::PathBuf::from("uploads"));
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert!(cfg.routes.health.enabled);
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_from("does-not-exist/inkwell").expect("defaults should load");
        let addr = cfg.get_socket_addr().expect("valid address");
        assert_eq!(addr.port(), 5008);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("inkwell.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[storage]\narticle_dir = \"/srv/articles\"\n",
        )
        .expect("write config");

        let base = dir.path().join("inkwell");
        let cfg = Config::load_from(base.to_str().expect("utf-8 path")).expect("load");
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.storage.article_dir, std::path::PathBuf::from("/srv/articles"));
        assert_eq!(cfg.storage.upload_dir, std::path::PathBuf::from("uploads"));
    }
}

// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{ExtractorError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest, prefix `INVOICE_LENS__`)
    /// 2. Config file (`path`, or `~/.invoice-lens/config.toml`)
    /// 3. Defaults (lowest)
    ///
    /// CLI flags are applied on top by the caller. The API key is read from
    /// `GOOGLE_API_KEY` last; a missing key is only reported at call time.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_sources(path)?;
        config.gemini.api_key = std::env::var(API_KEY_ENV).ok().and_then(ApiKey::new);
        Ok(config)
    }

    fn load_sources(path: Option<&Path>) -> Result<Self> {
        let file_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // An explicitly given file must exist
            .add_source(File::from(file_path).required(path.is_some()))
            .add_source(
                Environment::with_prefix("INVOICE_LENS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ExtractorError::Configuration(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ExtractorError::Configuration(e.to_string()))
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".invoice-lens")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\n\n[gemini]\nmodel = \"gemini-1.5-pro\"\n"
        )
        .unwrap();

        let config = AppConfig::load_sources(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.gemini.timeout_seconds, 300);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load_sources(Some(&missing)).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.logging.format, "pretty");
    }
}

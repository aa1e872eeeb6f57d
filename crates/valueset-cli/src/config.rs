//! Application configuration.
//!
//! Settings come from an optional JSON file:
//!
//! ```json
//! {
//!   "nlm": {
//!     "ticket_url": "https://vsac.nlm.nih.gov/vsac/ws/Ticket",
//!     "api_url": "https://vsac.nlm.nih.gov/vsac/svs/RetrieveValueSet"
//!   },
//!   "value_set_path": "db/code_sets",
//!   "store_path": "db/value_sets"
//! }
//! ```
//!
//! Missing keys fall back to the defaults shown above. Command-line options
//! override the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use valueset_loader::{LoaderError, LoaderResult, VsacConfig, DEFAULT_API_URL, DEFAULT_TICKET_URL};

const DEFAULT_VALUE_SET_PATH: &str = "db/code_sets";
const DEFAULT_STORE_PATH: &str = "db/value_sets";

/// NLM terminology service endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NlmConfig {
    pub ticket_url: String,
    pub api_url: String,
}

impl Default for NlmConfig {
    fn default() -> Self {
        Self {
            ticket_url: DEFAULT_TICKET_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub nlm: NlmConfig,
    /// Directory caching raw VSAC responses.
    pub value_set_path: PathBuf,
    /// Directory of the JSON document store.
    pub store_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nlm: NlmConfig::default(),
            value_set_path: PathBuf::from(DEFAULT_VALUE_SET_PATH),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl AppConfig {
    /// Reads the config file, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> LoaderResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(LoaderError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Builds the VSAC client settings with an explicit proxy.
    pub fn vsac_config(&self, proxy: Option<String>) -> VsacConfig {
        VsacConfig {
            ticket_url: self.nlm.ticket_url.clone(),
            api_url: self.nlm.api_url.clone(),
            proxy,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.value_set_path, PathBuf::from("db/code_sets"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"nlm": {"api_url": "https://example.org/svs"}, "store_path": "/data/vs"}"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.nlm.api_url, "https://example.org/svs");
        assert_eq!(config.nlm.ticket_url, DEFAULT_TICKET_URL);
        assert_eq!(config.store_path, PathBuf::from("/data/vs"));
        assert_eq!(config.value_set_path, PathBuf::from("db/code_sets"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/config.json")));
        assert!(matches!(result, Err(LoaderError::FileNotFound { .. })));
    }

    #[test]
    fn test_vsac_config_carries_proxy() {
        let config = AppConfig::default();
        let vsac = config.vsac_config(Some("http://proxy:8080".to_string()));
        assert_eq!(vsac.proxy.as_deref(), Some("http://proxy:8080"));
        assert_eq!(vsac.api_url, DEFAULT_API_URL);
        assert!(config.vsac_config(None).proxy.is_none());
    }
}

//! API key configuration
//!
//! The key comes from `--api-key` / `OPENAI_API_KEY` when set, otherwise
//! from the `API_KEY` field of a JSON config file:
//!
//! ```json
//! { "API_KEY": "sk-..." }
//! ```

use oaistat_core::error::{OaistatError, Result};
use oaistat_provider_api::ApiCredentials;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Contents of the JSON config file
#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    /// API key, as written in the sample config
    #[serde(rename = "API_KEY", default)]
    pub api_key: Option<String>,
}

impl ApiConfig {
    /// Parse config JSON; `path` is only used in error messages
    pub fn from_json_str(json: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| OaistatError::Parse {
            file: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Read a config file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            OaistatError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content, path)
    }
}

/// Resolve credentials from an explicit key or the config file
///
/// An explicit key wins and the file is not read.
pub async fn resolve_credentials(
    explicit_key: Option<&str>,
    config_path: Option<&Path>,
) -> Result<ApiCredentials> {
    if let Some(key) = explicit_key.filter(|k| !k.trim().is_empty()) {
        debug!("Using API key from command line or environment");
        return ApiCredentials::new(key);
    }

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    info!("Reading API key from {}", path.display());

    let config = ApiConfig::from_file(&path).await?;
    ApiCredentials::new(config.api_key.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config() {
        let config = ApiConfig::from_json_str(r#"{"API_KEY": "sk-abc"}"#, Path::new("config.json"))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-abc"));

        let empty = ApiConfig::from_json_str("{}", Path::new("config.json")).unwrap();
        assert!(empty.api_key.is_none());
    }

    #[test]
    fn test_malformed_config_names_file() {
        let result = ApiConfig::from_json_str("{", Path::new("my.json"));
        match result {
            Err(OaistatError::Parse { file, .. }) => assert_eq!(file, Path::new("my.json")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_explicit_key_skips_file() {
        let creds = resolve_credentials(Some("sk-flag"), Some(Path::new("/nonexistent.json"))).await;
        assert!(creds.is_ok());
    }

    #[tokio::test]
    async fn test_placeholder_key_in_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"API_KEY": "YOUR_API_KEY"}}"#).unwrap();

        let result = resolve_credentials(None, Some(file.path())).await;
        assert!(matches!(result, Err(OaistatError::Config(_))));
    }

    #[tokio::test]
    async fn test_key_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"API_KEY": "sk-from-file"}}"#).unwrap();

        assert!(resolve_credentials(Some("  "), Some(file.path())).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let result = resolve_credentials(None, Some(Path::new("/nonexistent/config.json"))).await;
        assert!(matches!(result, Err(OaistatError::Config(_))));
    }
}

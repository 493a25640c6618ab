//! Configuration management for the CV tailor

use crate::error::{Result, TailorError};
use crate::history::HistoryStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub selection: SelectionConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub project_count: usize,
    pub min_description_chars: usize,
    pub max_description_chars: usize,
    pub ellipsis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub profile: PathBuf,
    pub output_dir: PathBuf,
    pub templates_dir: Option<PathBuf>,
    /// Application history file, defaults to the user data directory
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o".to_string(),
                temperature: 0.1,
                max_tokens: 4000,
                timeout_secs: 60,
                max_retries: 1,
                retry_backoff_ms: 1000,
                api_key_env: "OPENAI_API_KEY".to_string(),
            },
            selection: SelectionConfig {
                project_count: 2,
                min_description_chars: 100,
                max_description_chars: 165,
                ellipsis: "...".to_string(),
            },
            paths: PathsConfig {
                profile: PathBuf::from("templates/user_profile.yaml"),
                output_dir: PathBuf::from("output"),
                templates_dir: None,
                history_file: None,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load the configuration from the default location, creating it on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                TailorError::Configuration(format!(
                    "Failed to parse config {}: {}",
                    config_path.display(),
                    e
                ))
            })?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            TailorError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-tailor")
            .join("config.toml")
    }

    /// Reject settings the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        let selection = &self.selection;
        if selection.project_count < 1 {
            return Err(TailorError::Configuration(
                "selection.project_count must be at least 1".to_string(),
            ));
        }
        if selection.max_description_chars < selection.min_description_chars {
            return Err(TailorError::Configuration(format!(
                "selection.max_description_chars ({}) is below min_description_chars ({})",
                selection.max_description_chars, selection.min_description_chars
            )));
        }
        if selection.max_description_chars <= selection.ellipsis.chars().count() {
            return Err(TailorError::Configuration(
                "selection.max_description_chars must leave room for the ellipsis".to_string(),
            ));
        }
        if self.service.max_retries > 1 {
            return Err(TailorError::Configuration(
                "service.max_retries may be 0 or 1".to_string(),
            ));
        }
        if self.service.timeout_secs == 0 {
            return Err(TailorError::Configuration(
                "service.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn history_path(&self) -> PathBuf {
        self.paths
            .history_file
            .clone()
            .unwrap_or_else(HistoryStore::default_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.service.retry_backoff_ms)
    }
}

/// Secret material read from the process environment, never from the config file
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env(config: &Config) -> Result<Self> {
        dotenvy::dotenv().ok();
        let var = &config.service.api_key_env;
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self {
                api_key: key.trim().to_string(),
            }),
            _ => Err(TailorError::Configuration(format!(
                "{} is not set. Export it or add it to a .env file, or run with --offline",
                var
            ))),
        }
    }
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> std::result::Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.selection.project_count, 2);
        assert_eq!(config.selection.max_description_chars, 165);
        assert_eq!(config.service.max_retries, 1);
    }

    #[test]
    fn test_rejects_zero_project_count() {
        let mut config = Config::default();
        config.selection.project_count = 0;
        assert!(matches!(
            config.validate(),
            Err(TailorError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_unbounded_retries() {
        let mut config = Config::default();
        config.service.max_retries = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.service.model, "gpt-4o");

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.selection.min_description_chars, 100);
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("MD").unwrap(), OutputFormat::Markdown);
        assert!(parse_output_format("pdf").is_err());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials {
            api_key: "sk-secret".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("sk-secret"));
    }
}

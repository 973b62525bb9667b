//! Configuration loading, validation, and management for Rescueline.
//!
//! Loads configuration from `~/.rescueline/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.rescueline/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generative-text service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for answer generation
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature for answer generation
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Maximum tokens per generated answer
    #[serde(default = "default_max_output_tokens")]
    pub default_max_output_tokens: u32,

    /// Context assembly configuration
    #[serde(default)]
    pub context: ContextConfig,

    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Generator endpoint configuration
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_temperature() -> f32 {
    0.4
}
fn default_max_output_tokens() -> u32 {
    1024
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_output_tokens", &self.default_max_output_tokens)
            .field("context", &self.context)
            .field("store", &self.store)
            .field("generator", &self.generator)
            .field("gateway", &self.gateway)
            .finish()
    }
}

/// Context assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum documents stuffed into one context block.
    ///
    /// There is no relevance ranking behind the fetch, so this bound is the
    /// only thing standing between the prompt and unbounded growth.
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,
}

fn default_max_documents() -> usize {
    5
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_documents: default_max_documents(),
        }
    }
}

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend: "sqlite" or "in_memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database path; defaults to `~/.rescueline/rescueline.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_store_backend() -> String {
    "sqlite".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
        }
    }
}

/// Generator endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Provider name; only "gemini" is currently built in
    #[serde(default = "default_generator_provider")]
    pub provider: String,

    /// Override the API base URL (testing, proxies)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

fn default_generator_provider() -> String {
    "gemini".into()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: default_generator_provider(),
            api_url: None,
        }
    }
}

/// Gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.rescueline/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `RESCUELINE_API_KEY` (highest priority)
    /// - `GEMINI_API_KEY`
    /// - `GOOGLE_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = Self::config_dir();
        let config_path = config_dir.join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("RESCUELINE_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok())
                .or_else(|| std::env::var("GOOGLE_API_KEY").ok());
        }

        // Allow env var to override the model
        if let Ok(model) = std::env::var("RESCUELINE_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rescueline")
    }

    /// Resolve the SQLite database path.
    pub fn database_path(&self) -> PathBuf {
        match &self.store.path {
            Some(path) => PathBuf::from(path),
            None => Self::config_dir().join("rescueline.db"),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.context.max_documents == 0 {
            return Err(ConfigError::ValidationError(
                "context.max_documents must be at least 1".into(),
            ));
        }

        match self.store.backend.as_str() {
            "sqlite" | "in_memory" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown store backend '{other}' (expected sqlite or in_memory)"
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_output_tokens: default_max_output_tokens(),
            context: ContextConfig::default(),
            store: StoreConfig::default(),
            generator: GeneratorConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_model, "gemini-1.5-flash");
        assert_eq!(config.context.max_documents, 5);
        assert_eq!(config.gateway.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.context.max_documents, config.context.max_documents);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_document_bound_rejected() {
        let config = AppConfig {
            context: ContextConfig { max_documents: 0 },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_backend_rejected() {
        let config = AppConfig {
            store: StoreConfig {
                backend: "mongodb".into(),
                path: None,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.default_model, "gemini-1.5-flash");
    }

    #[test]
    fn config_file_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_model = "gemini-1.5-pro"

[context]
max_documents = 3

[gateway]
port = 8080
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_model, "gemini-1.5-pro");
        assert_eq!(config.context.max_documents, 3);
        assert_eq!(config.gateway.port, 8080);
        // Untouched sections keep their defaults
        assert_eq!(config.store.backend, "sqlite");
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gemini-1.5-flash"));
        assert!(toml_str.contains("max_documents"));
    }

    #[test]
    fn database_path_override() {
        let config = AppConfig {
            store: StoreConfig {
                backend: "sqlite".into(),
                path: Some("/var/lib/rescueline/docs.db".into()),
            },
            ..AppConfig::default()
        };
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/rescueline/docs.db")
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("AIza-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("AIza-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}

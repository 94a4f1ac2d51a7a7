//! Configuration loading, validation, and management for StickerMatch.
//!
//! Loads configuration from `~/.stickermatch/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.stickermatch/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Embedding model configuration
    #[serde(default)]
    pub embedder: EmbedderConfig,

    /// Vector store configuration
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Cloudflare account credentials (Workers AI + Vectorize)
    #[serde(default)]
    pub cloudflare: CloudflareConfig,

    /// Recently-used sticker detection
    #[serde(default)]
    pub recency: RecencyConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Maximum accepted request body size
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Allowed CORS origins. `["*"]` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_body_limit() -> usize {
    64 * 1024
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            body_limit_bytes: default_body_limit(),
            cors_allowed_origins: default_cors_origins(),
        }
    }
}

/// Which embedding backend to use and how to reach it.
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbedderConfig {
    /// "workers_ai", "openai", or "none". Any other name is treated as an
    /// OpenAI-compatible endpoint and requires `api_url`.
    #[serde(default = "default_embedder_provider")]
    pub provider: String,

    /// Model identifier; provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedder_provider() -> String {
    "workers_ai".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: default_embedder_provider(),
            model: None,
            api_url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for EmbedderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// "vectorize", "in_memory", or "none"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Vectorize index name
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// JSON catalog file for the in-memory backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,

    /// Upper bound on candidates requested per query
    #[serde(default = "default_max_query_limit")]
    pub max_query_limit: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_store_backend() -> String {
    "vectorize".into()
}
fn default_index_name() -> String {
    "stickers".into()
}
fn default_max_query_limit() -> usize {
    50
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            index_name: default_index_name(),
            catalog_path: None,
            max_query_limit: default_max_query_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CloudflareConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl std::fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("account_id", &self.account_id)
            .field("api_token", &redact(&self.api_token))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecencyConfig {
    /// Whether the built-in reference patterns are active
    #[serde(default = "default_true")]
    pub builtin_patterns: bool,

    /// Additional regular expressions with a named `id` capture group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_patterns: Vec<String>,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            builtin_patterns: true,
            extra_patterns: vec![],
        }
    }
}

/// Smallest allowed `max_query_limit`: a full page of results must fit.
const MIN_QUERY_LIMIT: usize = 20;

const KNOWN_STORE_BACKENDS: &[&str] = &["vectorize", "in_memory", "none"];

impl AppConfig {
    /// Load configuration from the default path (~/.stickermatch/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `STICKERMATCH_EMBEDDER`, `STICKERMATCH_VECTOR_STORE`
    /// - `STICKERMATCH_API_KEY`, then `OPENAI_API_KEY` (embedder key)
    /// - `CLOUDFLARE_ACCOUNT_ID`, `CLOUDFLARE_API_TOKEN`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
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

    /// Apply overrides from an environment lookup.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(provider) = var("STICKERMATCH_EMBEDDER") {
            self.embedder.provider = provider;
        }
        if let Some(backend) = var("STICKERMATCH_VECTOR_STORE") {
            self.vector_store.backend = backend;
        }
        if self.embedder.api_key.is_none() {
            self.embedder.api_key =
                var("STICKERMATCH_API_KEY").or_else(|| var("OPENAI_API_KEY"));
        }
        if let Some(account) = var("CLOUDFLARE_ACCOUNT_ID") {
            self.cloudflare.account_id = Some(account);
        }
        if let Some(token) = var("CLOUDFLARE_API_TOKEN") {
            self.cloudflare.api_token = Some(token);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".stickermatch")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.port == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.port must be non-zero".into(),
            ));
        }

        if self.gateway.body_limit_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.body_limit_bytes must be > 0".into(),
            ));
        }

        if self.vector_store.max_query_limit < MIN_QUERY_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "vector_store.max_query_limit must be at least {MIN_QUERY_LIMIT}"
            )));
        }

        if self.embedder.timeout_secs == 0 || self.vector_store.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be > 0 seconds".into(),
            ));
        }

        if !KNOWN_STORE_BACKENDS.contains(&self.vector_store.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown vector_store.backend '{}' (expected one of {})",
                self.vector_store.backend,
                KNOWN_STORE_BACKENDS.join(", ")
            )));
        }

        let provider = self.embedder.provider.as_str();
        let well_known = matches!(provider, "workers_ai" | "openai" | "none");
        if !well_known && self.embedder.api_url.is_none() {
            return Err(ConfigError::ValidationError(format!(
                "embedder.provider '{provider}' needs embedder.api_url"
            )));
        }

        if self.vector_store.backend == "in_memory" && self.vector_store.catalog_path.is_none() {
            return Err(ConfigError::ValidationError(
                "vector_store.catalog_path is required for the in_memory backend".into(),
            ));
        }

        Ok(())
    }

    /// Whether enough Cloudflare credentials are present to call its APIs.
    pub fn has_cloudflare_credentials(&self) -> bool {
        self.cloudflare.account_id.is_some() && self.cloudflare.api_token.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
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
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.port, 8787);
        assert_eq!(config.embedder.provider, "workers_ai");
        assert_eq!(config.vector_store.backend, "vectorize");
        assert_eq!(config.gateway.cors_allowed_origins, vec!["*"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.embedder.provider, config.embedder.provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn small_query_limit_rejected() {
        let mut config = AppConfig::default();
        config.vector_store.max_query_limit = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_backend_rejected() {
        let mut config = AppConfig::default();
        config.vector_store.backend = "pinecone".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pinecone"));
    }

    #[test]
    fn custom_embedder_needs_url() {
        let mut config = AppConfig::default();
        config.embedder.provider = "ollama".into();
        assert!(config.validate().is_err());
        config.embedder.api_url = Some("http://localhost:11434/v1".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn in_memory_backend_needs_catalog() {
        let mut config = AppConfig::default();
        config.vector_store.backend = "in_memory".into();
        assert!(config.validate().is_err());
        config.vector_store.catalog_path = Some("/tmp/catalog.json".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().gateway.port, 8787);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[gateway]
port = 9000
cors_allowed_origins = ["https://stickers.example.com"]

[embedder]
provider = "openai"
model = "text-embedding-3-small"

[vector_store]
backend = "in_memory"
catalog_path = "/srv/catalog.json"

[recency]
extra_patterns = ['emoji:(?P<id>[a-z0-9]+)']
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.embedder.model.as_deref(), Some("text-embedding-3-small"));
        assert_eq!(config.vector_store.backend, "in_memory");
        assert_eq!(config.recency.extra_patterns.len(), 1);
        assert!(config.recency.builtin_patterns);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway\nport = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("STICKERMATCH_EMBEDDER", "openai"),
            ("OPENAI_API_KEY", "sk-test"),
            ("CLOUDFLARE_ACCOUNT_ID", "acct"),
            ("CLOUDFLARE_API_TOKEN", "tok"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.embedder.provider, "openai");
        assert_eq!(config.embedder.api_key.as_deref(), Some("sk-test"));
        assert!(config.has_cloudflare_credentials());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.embedder.api_key = Some("sk-secret".into());
        config.cloudflare.api_token = Some("cf-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("cf-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("workers_ai"));
        assert!(toml_str.contains("8787"));
    }
}

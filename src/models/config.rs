//! Configuration models for the Hyperbolic adapter.
//!
//! Every tunable has a default matching the provider's observed behavior;
//! only the model identifier is required.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Provider tag every model identifier must start with.
pub const MODEL_PREFIX: &str = "hyperbolic/";

/// Configuration for one Hyperbolic-backed model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Prefixed model identifier (e.g., "hyperbolic/meta-llama/Meta-Llama-3.1-70B")
    pub model: String,

    /// Base URL for the Hyperbolic API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name the API key is looked up under
    #[serde(default = "default_api_key_name")]
    pub api_key_name: String,

    /// JSON keys file consulted before the environment
    #[serde(default = "default_keys_file")]
    pub keys_file: PathBuf,

    /// Minimum spacing between the start of two requests
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Maximum HTTP attempts for one completion
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait after a 429 before retrying a completion
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Completion token budget
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Model used for the embeddings endpoint
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Request timeout in seconds (none unless set)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://api.hyperbolic.xyz/v1".to_string()
}

fn default_api_key_name() -> String {
    "HYPERBOLIC_API_KEY".to_string()
}

fn default_keys_file() -> PathBuf {
    PathBuf::from("keys.json")
}

fn default_min_interval_ms() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    2000
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

impl ProviderConfig {
    /// Configuration for `model` with every other field at its default.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: default_base_url(),
            api_key_name: default_api_key_name(),
            keys_file: default_keys_file(),
            min_interval_ms: default_min_interval_ms(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            embedding_model: default_embedding_model(),
            timeout_secs: None,
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Model name sent to the API, with the provider tag stripped.
    pub fn model_name(&self) -> Result<&str, ConfigError> {
        strip_model_prefix(&self.model)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Strip the `hyperbolic/` tag from a model identifier.
///
/// Only the leading tag is removed; the remainder may itself contain `/`.
pub fn strip_model_prefix(model: &str) -> Result<&str, ConfigError> {
    model
        .strip_prefix(MODEL_PREFIX)
        .ok_or_else(|| ConfigError::InvalidModelName(model.to_string()))
}

/// Expand environment variables in a string.
///
/// Supports ${VAR_NAME} syntax.
/// If the variable is not set, the placeholder is left unchanged.
pub fn expand_env_vars(s: &str) -> String {
    expand_with(s, |name| std::env::var(name).ok())
}

fn expand_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid");
    re.replace_all(s, |cap: &regex::Captures<'_>| {
        lookup(&cap[1]).unwrap_or_else(|| cap[0].to_string())
    })
    .into_owned()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Hyperbolic model names must start with \"hyperbolic/\", got '{0}'")]
    InvalidModelName(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_strip_prefix_keeps_remainder() {
        assert_eq!(
            strip_model_prefix("hyperbolic/meta-llama/Meta-Llama-3.1-70B").unwrap(),
            "meta-llama/Meta-Llama-3.1-70B"
        );
        assert_eq!(strip_model_prefix("hyperbolic/").unwrap(), "");
    }

    #[test]
    fn test_strip_prefix_rejects_other_providers() {
        for bad in ["openai/gpt-4o", "meta-llama/hyperbolic/x", "Hyperbolic/x", ""] {
            let err = strip_model_prefix(bad).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidModelName(ref m) if m == bad));
        }
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"model = "hyperbolic/deepseek-ai/DeepSeek-V3""#).unwrap();

        let config = ProviderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.model_name().unwrap(), "deepseek-ai/DeepSeek-V3");
        assert_eq!(config.base_url, "https://api.hyperbolic.xyz/v1");
        assert_eq!(config.api_key_name, "HYPERBOLIC_API_KEY");
        assert_eq!(config.min_interval(), Duration::from_millis(1000));
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_backoff(), Duration::from_millis(2000));
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_file_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
model = "hyperbolic/x"
base_url = "http://localhost:9000/v1"
min_interval_ms = 50
retry_backoff_ms = 5
timeout_secs = 30
"#
        )
        .unwrap();

        let config = ProviderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.min_interval(), Duration::from_millis(50));
        assert_eq!(config.retry_backoff(), Duration::from_millis(5));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_model_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"base_url = "http://x""#).unwrap();
        assert!(matches!(
            ProviderConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ProviderConfig::from_file(Path::new("/nonexistent/hyperbolic.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_expand_placeholders() {
        let lookup = |name: &str| (name == "HOST").then(|| "example.org".to_string());
        assert_eq!(expand_with("https://${HOST}/v1", lookup), "https://example.org/v1");
        assert_eq!(expand_with("${MISSING}-key", lookup), "${MISSING}-key");
        assert_eq!(expand_with("plain", lookup), "plain");
    }
}

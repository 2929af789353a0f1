//! Credential sources.
//!
//! A client asks its `KeySource` for the API key exactly once, when it is
//! constructed. Sources are injected so tests never touch the environment.

use super::expand_env_vars;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Synchronous "get secret by name" capability.
pub trait KeySource: Send + Sync {
    fn get_key(&self, name: &str) -> Result<String, KeyError>;
}

/// Reads keys from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvKeys;

impl KeySource for EnvKeys {
    fn get_key(&self, name: &str) -> Result<String, KeyError> {
        lookup_env(name).ok_or_else(|| KeyError::NotFound {
            name: name.to_string(),
        })
    }
}

/// In-memory key map.
#[derive(Debug, Clone, Default)]
pub struct StaticKeys {
    keys: HashMap<String, String>,
}

impl StaticKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.insert(name.into(), value.into());
        self
    }
}

impl KeySource for StaticKeys {
    fn get_key(&self, name: &str) -> Result<String, KeyError> {
        self.keys
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| KeyError::NotFound {
                name: name.to_string(),
            })
    }
}

/// Keys file with environment fallback.
///
/// The file is a flat JSON object of `name -> value`. Values may contain
/// `${VAR}` placeholders. Names that are absent or empty in the file are
/// looked up in the environment.
#[derive(Debug, Clone, Default)]
pub struct KeyChain {
    file_keys: HashMap<String, String>,
}

impl KeyChain {
    /// Load `path`; a missing file leaves only the environment.
    pub fn load(path: &Path) -> Result<Self, KeyError> {
        if !path.exists() {
            debug!(path = %path.display(), "No keys file, using environment only");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| KeyError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        let file_keys: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|e| KeyError::Parse {
                path: path.to_owned(),
                source: e,
            })?;

        debug!(path = %path.display(), keys = file_keys.len(), "Loaded keys file");
        Ok(Self { file_keys })
    }
}

impl KeySource for KeyChain {
    fn get_key(&self, name: &str) -> Result<String, KeyError> {
        self.file_keys
            .get(name)
            .map(|v| expand_env_vars(v))
            .filter(|v| !v.is_empty())
            .or_else(|| lookup_env(name))
            .ok_or_else(|| KeyError::NotFound {
                name: name.to_string(),
            })
    }
}

fn lookup_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Credential lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("API key not found: set {name} in the keys file or environment")]
    NotFound { name: String },

    #[error("Failed to read keys file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse keys file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

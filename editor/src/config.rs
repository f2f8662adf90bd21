use std::io;
use std::path::{Path, PathBuf};

use lumen_core::abstract_editor::DEFAULT_MAX_UNDO;
use lumen_lights::SnapSettings;
use serde::Deserialize;

/// Editor settings loaded from `editor.toml`.
///
/// Every table and key is optional:
///
/// ```toml
/// log_level = "debug"
///
/// [history]
/// max_undo = 200
///
/// [snap]
/// enabled = true
/// translation = 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Default `env_logger` filter. `RUST_LOG` takes precedence.
    pub log_level: String,
    pub history: HistoryConfig,
    pub snap: SnapSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            history: HistoryConfig::default(),
            snap: SnapSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_undo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub fn parse_config(source: &str, path: &Path) -> Result<EditorConfig, ConfigError> {
    toml::from_str(source).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Loads a config file. A missing file yields `Ok(None)`.
pub fn load_config(path: &Path) -> Result<Option<EditorConfig>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(source) => parse_config(&source, path).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_owned(),
            source,
        }),
    }
}

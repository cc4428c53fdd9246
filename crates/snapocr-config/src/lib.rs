use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use self::hotkey::HotkeyConfig;
use self::ocr::OcrConfig;
use self::selection::SelectionConfig;
use self::ui::UiConfig;

pub mod hotkey;
pub mod ocr;
pub mod selection;
pub mod ui;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub hotkey: HotkeyConfig,
    pub selection: SelectionConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Defaults, with env vars taking precedence over built-in values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON profile; missing sections fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ocr.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("ocr.endpoint is empty".into()));
        }
        if self.ocr.model.trim().is_empty() {
            return Err(ConfigError::Invalid("ocr.model is empty".into()));
        }
        if self.ocr.timeout_secs == 0 {
            return Err(ConfigError::Invalid("ocr.timeout_secs must be positive".into()));
        }
        if self.selection.min_size < 0 {
            return Err(ConfigError::Invalid(
                "selection.min_size must not be negative".into(),
            ));
        }
        if self.hotkey.enabled && self.hotkey.accelerator.trim().is_empty() {
            return Err(ConfigError::Invalid("hotkey.accelerator is empty".into()));
        }
        Ok(())
    }
}

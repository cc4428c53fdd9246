use std::env;

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_accelerator() -> String {
    env::var("SNAPOCR_HOTKEY").unwrap_or_else(|_| "F1".to_string())
}

fn default_poll_interval_ms() -> u64 {
    env::var("SNAPOCR_POLL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(50)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeyConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Accelerator string, e.g. `F1` or `ctrl+shift+KeyS`
    #[serde(default = "default_accelerator")]
    pub accelerator: String,
    /// How often the listener checks the hotkey and the shutdown flag
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            accelerator: default_accelerator(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

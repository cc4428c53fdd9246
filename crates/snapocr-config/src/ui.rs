use serde::{Deserialize, Serialize};

fn default_copy_to_clipboard() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    /// Copy successful results to the clipboard
    #[serde(default = "default_copy_to_clipboard")]
    pub copy_to_clipboard: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            copy_to_clipboard: default_copy_to_clipboard(),
        }
    }
}

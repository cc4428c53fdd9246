use serde::{Deserialize, Serialize};
use snapocr_types::MIN_SELECTION_SIZE;

fn default_min_size() -> i32 {
    MIN_SELECTION_SIZE
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SelectionConfig {
    /// Width and height must both exceed this many pixels
    #[serde(default = "default_min_size")]
    pub min_size: i32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
        }
    }
}

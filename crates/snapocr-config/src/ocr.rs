use std::env;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROMPT: &str = r#"Please perform OCR text recognition on the image and strictly follow these output requirements:
1. Output format: Pure Markdown format
2. Preserve original paragraph structure and line breaks
3. Mathematical formula format requirements (Important):
   - Inline math formulas must use: $ formula content $
   - Block math formulas must use: $$ formula content $$
   - Do NOT use \( \) format! Must convert to $ $ format
   - Do NOT use \[ \] format! Must convert to $$ $$ format
4. Other requirements:
   - Do not add any explanations or comments
   - Ignore excess line breaks that OCR might produce
   - Maintain semantic coherence
   - Output recognition results directly"#;

fn default_endpoint() -> String {
    env::var("SNAPOCR_ENDPOINT").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_model() -> String {
    env::var("SNAPOCR_MODEL").unwrap_or_else(|_| "qwen2.5vl:7b".to_string())
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_timeout_secs() -> u64 {
    env::var("SNAPOCR_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(600) // 10 minutes, vision models are slow on CPU
}

fn default_markdown_math() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    /// Base URL of the Ollama-compatible service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Rewrite LaTeX math delimiters into markdown `$`/`$$`
    #[serde(default = "default_markdown_math")]
    pub markdown_math: bool,
}

impl OcrConfig {
    /// `{endpoint}/api/generate`
    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.endpoint.trim_end_matches('/'))
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            prompt: default_prompt(),
            timeout_secs: default_timeout_secs(),
            markdown_math: default_markdown_math(),
        }
    }
}

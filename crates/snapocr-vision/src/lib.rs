mod capture;
mod hotkey;
mod ollama;

pub use capture::XcapScreen;
pub use hotkey::HotkeyManager;
pub use ollama::OllamaRecognizer;

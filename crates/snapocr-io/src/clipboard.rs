use anyhow::Context;
use arboard::Clipboard;

/// Put recognized text on the system clipboard
pub fn copy_text(text: &str) -> Result<(), anyhow::Error> {
    let mut clipboard = Clipboard::new().context("Failed to open clipboard")?;
    clipboard
        .set_text(text.to_owned())
        .context("Failed to write clipboard")?;
    tracing::debug!("Copied {} chars to clipboard", text.chars().count());
    Ok(())
}

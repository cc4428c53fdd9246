use image::RgbaImage;
use kanal::AsyncSender;
use snapocr_core::{CaptureError, Presenter};
use snapocr_types::{AppEvent, RecognitionResult, Rectangle, ScreenImage, SessionId, StatusSnapshot};

use crate::command::drag_events;

/// Headless presenter: results go to stdout, logs to stderr
///
/// With a scripted region the overlay "draws" that region itself by posting
/// the pointer events back to the UI context.
pub struct ConsolePresenter {
    copy_to_clipboard: bool,
    script: Option<Rectangle>,
    event_tx: AsyncSender<AppEvent>,
}

impl ConsolePresenter {
    pub fn new(
        copy_to_clipboard: bool,
        script: Option<Rectangle>,
        event_tx: AsyncSender<AppEvent>,
    ) -> Self {
        Self {
            copy_to_clipboard,
            script,
            event_tx,
        }
    }
}

impl Presenter for ConsolePresenter {
    fn show_overlay(&mut self, session: SessionId, screen: &ScreenImage) {
        tracing::info!(
            "[UI] Overlay {} over {}x{} screen, drag to select, Enter to confirm, Esc to cancel",
            session,
            screen.width(),
            screen.height()
        );

        if let Some(rect) = self.script {
            tracing::debug!("[UI] Replaying scripted selection {}", rect);
            for event in drag_events(rect) {
                match self.event_tx.try_send(event) {
                    Ok(true) => {}
                    Ok(false) => tracing::warn!("[UI] Event queue full, scripted selection truncated"),
                    Err(e) => tracing::error!("[UI] Failed to queue scripted selection: {}", e),
                }
            }
        }
    }

    fn selection_changed(&mut self, session: SessionId, rect: Rectangle, valid: bool) {
        if valid {
            tracing::debug!("[UI] {} selection {}", session, rect);
        } else {
            tracing::debug!("[UI] {} selection {} (too small)", session, rect);
        }
    }

    fn hide_overlay(&mut self, session: SessionId) {
        tracing::debug!("[UI] Overlay {} closed", session);
    }

    fn recognition_started(&mut self, session: SessionId, crop: &RgbaImage) {
        tracing::info!(
            "[UI] {} recognizing {}x{} region...",
            session,
            crop.width(),
            crop.height()
        );
    }

    fn show_result(&mut self, session: SessionId, result: &RecognitionResult) {
        match result {
            RecognitionResult::Text(text) => {
                tracing::info!("[UI] {} recognized {} chars", session, text.chars().count());
                println!("{text}");

                if self.copy_to_clipboard
                    && let Err(e) = snapocr_io::clipboard::copy_text(text)
                {
                    tracing::warn!("[UI] Clipboard copy failed: {:#}", e);
                }
            }
            RecognitionResult::Failed(failure) => {
                tracing::warn!("[UI] {} recognition failed: {}", session, failure);
                println!("OCR failed: {failure}");
            }
        }
    }

    fn capture_failed(&mut self, error: &CaptureError) {
        println!("Screenshot failed: {error}");
    }

    fn show_status(&mut self, status: &StatusSnapshot) {
        println!(
            "{} | sessions: {} | recognized: {} | failed: {} | cancelled: {}",
            status.activity,
            status.sessions_started,
            status.recognitions_completed,
            status.recognition_failures,
            status.sessions_cancelled
        );
    }
}

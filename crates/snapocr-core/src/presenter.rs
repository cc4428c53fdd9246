use image::RgbaImage;
use snapocr_types::{RecognitionResult, Rectangle, ScreenImage, SessionId, StatusSnapshot};

use crate::error::CaptureError;

/// Presentation collaborator called by the coordinator
///
/// Implementations render or report; they never drive session state
/// directly. Every slot has a no-op default.
pub trait Presenter: Send {
    /// Full-screen overlay over the frozen snapshot
    fn show_overlay(&mut self, _session: SessionId, _screen: &ScreenImage) {}

    /// Live rectangle while dragging, `valid` against the size threshold
    fn selection_changed(&mut self, _session: SessionId, _rect: Rectangle, _valid: bool) {}

    fn hide_overlay(&mut self, _session: SessionId) {}

    /// Cropped region handed to recognition
    fn recognition_started(&mut self, _session: SessionId, _crop: &RgbaImage) {}

    fn show_result(&mut self, _session: SessionId, _result: &RecognitionResult) {}

    fn capture_failed(&mut self, _error: &CaptureError) {}

    fn show_status(&mut self, _status: &StatusSnapshot) {}
}

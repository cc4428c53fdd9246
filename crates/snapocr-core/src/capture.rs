use snapocr_types::ScreenImage;

use crate::error::CaptureError;

/// Platform full-screen snapshot
pub trait ScreenCapturer: Send + Sync {
    fn capture(&self) -> Result<ScreenImage, CaptureError>;
}

use anyhow::{Context, Result};
use snapocr_core::{CaptureError, ScreenCapturer};
use snapocr_types::{Point, ScreenImage};
use xcap::Monitor;

/// Capture the entire primary monitor as raw RGBA
fn capture_primary_screen() -> Result<ScreenImage> {
    let monitors = Monitor::all().context("Failed to get monitors")?;
    let monitor = monitors
        .iter()
        .find(|m| m.is_primary())
        .or(monitors.first())
        .context("No monitor found")?;

    let origin = Point::new(monitor.x(), monitor.y());
    let image = monitor.capture_image().context("Failed to capture screen")?;
    let (width, height) = (image.width(), image.height());

    ScreenImage::from_raw(origin, width, height, image.into_raw())
        .context("Captured buffer does not match its dimensions")
}

/// Full-screen snapshots of the primary monitor through xcap
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapScreen;

impl ScreenCapturer for XcapScreen {
    fn capture(&self) -> Result<ScreenImage, CaptureError> {
        let start = std::time::Instant::now();
        let image = capture_primary_screen().map_err(|e| CaptureError::Platform(format!("{e:#}")))?;
        tracing::debug!(
            ">>> [CAPTURE] {}x{} in {:?}",
            image.width(),
            image.height(),
            start.elapsed()
        );
        Ok(image)
    }
}

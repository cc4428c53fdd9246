use snapocr_types::Rectangle;

use crate::session::SessionState;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },

    /// Confirm pressed without a large enough selection; session stays selecting
    #[error("no valid selection to confirm (last drag: {candidate:?})")]
    NoValidSelection { candidate: Option<Rectangle> },

    /// Dispatch attempted without capture data, a programming error
    #[error("dispatch without capture data (image: {has_image}, selection: {has_selection})")]
    MissingCaptureData {
        has_image: bool,
        has_selection: bool,
    },

    /// Selection does not overlap the snapshot, also a programming error
    #[error("selection {0} lies outside the captured screen")]
    SelectionOutsideScreen(Rectangle),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    #[error("no monitor available")]
    NoMonitor,

    #[error("screen capture failed: {0}")]
    Platform(String),
}

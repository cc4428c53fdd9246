//! One screenshot-to-result lifecycle
//!
//! ```text
//! Idle -> Capturing -> Selecting -> Confirmed -> Recognizing -> Completed
//!            \______________\___________\____________\-> Cancelled
//! ```
//!
//! Every transition is checked here; callers get `SessionError::InvalidTransition`
//! instead of a silently corrupted session.

use image::RgbaImage;
use snapocr_types::{Point, RecognitionResult, Rectangle, ScreenImage, SessionId};

use crate::capture::ScreenCapturer;
use crate::error::SessionError;
use crate::selector::{RegionSelector, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Capturing,
    Selecting,
    Confirmed,
    Recognizing,
    Completed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Escape, or any other deliberate user abort
    User,
    /// Dispatch found the session without its capture data
    InvariantViolation,
    Shutdown,
}

/// Resources released by one teardown call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Teardown {
    pub image: bool,
    pub overlay: bool,
}

impl Teardown {
    pub fn is_empty(&self) -> bool {
        !self.image && !self.overlay
    }
}

#[derive(Debug)]
pub struct CaptureSession {
    id: SessionId,
    state: SessionState,
    image: Option<ScreenImage>,
    overlay_open: bool,
    selector: RegionSelector,
    selection: Option<Rectangle>,
    result: Option<RecognitionResult>,
    cancel_reason: Option<CancelReason>,
}

impl CaptureSession {
    pub fn new(id: SessionId, min_size: i32) -> Self {
        Self {
            id,
            state: SessionState::Idle,
            image: None,
            overlay_open: false,
            selector: RegionSelector::new(min_size),
            selection: None,
            result: None,
            cancel_reason: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn screen(&self) -> Option<&ScreenImage> {
        self.image.as_ref()
    }

    /// Promotable selection, only ever a rectangle above the size threshold
    pub fn selection(&self) -> Option<Rectangle> {
        self.selection
    }

    /// Last drawn rectangle including sub-threshold feedback
    pub fn preview(&self) -> Option<Rectangle> {
        self.selector.current()
    }

    pub fn result(&self) -> Option<&RecognitionResult> {
        self.result.as_ref()
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.cancel_reason
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay_open
    }

    fn expect_state(&self, expected: SessionState, action: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.state,
                action,
            })
        }
    }

    /// Idle -> Capturing, taking the full-screen snapshot
    ///
    /// A capture failure leaves the session `Idle` and holding nothing.
    pub fn activate(&mut self, capturer: &dyn ScreenCapturer) -> Result<(), SessionError> {
        self.expect_state(SessionState::Idle, "activate")?;
        self.state = SessionState::Capturing;

        match capturer.capture() {
            Ok(image) => {
                tracing::debug!(
                    "[SESSION {}] Captured {}x{} screen",
                    self.id,
                    image.width(),
                    image.height()
                );
                self.image = Some(image);
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Idle;
                Err(e.into())
            }
        }
    }

    /// Capturing -> Selecting, the overlay is now on screen
    pub fn present(&mut self) -> Result<(), SessionError> {
        self.expect_state(SessionState::Capturing, "present")?;
        self.overlay_open = true;
        self.state = SessionState::Selecting;
        Ok(())
    }

    pub fn pointer_down(&mut self, point: Point) -> Result<(), SessionError> {
        self.expect_state(SessionState::Selecting, "start a selection")?;
        self.selector.begin(point);
        self.selection = None;
        Ok(())
    }

    pub fn pointer_drag(&mut self, point: Point) -> Result<Option<Rectangle>, SessionError> {
        self.expect_state(SessionState::Selecting, "drag a selection")?;
        Ok(self.selector.update(point))
    }

    /// Finish a drag; a valid rectangle becomes the candidate selection
    ///
    /// The rectangle is clipped to the snapshot first, so the size threshold
    /// applies to the pixels that would actually be sent.
    pub fn pointer_up(&mut self, point: Point) -> Result<Option<Selection>, SessionError> {
        self.expect_state(SessionState::Selecting, "finish a selection")?;
        let selection = self.selector.end(point).map(|s| self.clip_to_screen(s));
        if let Some(Selection::Valid(rect)) = selection {
            self.selection = Some(rect);
        }
        Ok(selection)
    }

    fn clip_to_screen(&self, selection: Selection) -> Selection {
        let (Selection::Valid(rect), Some(screen)) = (selection, self.image.as_ref()) else {
            return selection;
        };
        match screen.bounds().intersect(rect) {
            Some(visible) if visible.is_valid_selection(self.selector.min_size()) => {
                Selection::Valid(visible)
            }
            Some(visible) => Selection::TooSmall(visible),
            None => Selection::TooSmall(rect),
        }
    }

    /// Selecting -> Confirmed; rejected without a valid selection
    pub fn confirm(&mut self) -> Result<Rectangle, SessionError> {
        self.expect_state(SessionState::Selecting, "confirm")?;
        match self.selection {
            Some(rect) => {
                self.state = SessionState::Confirmed;
                Ok(rect)
            }
            None => Err(SessionError::NoValidSelection {
                candidate: self.selector.current(),
            }),
        }
    }

    /// Confirmed -> Recognizing
    ///
    /// Returns the cropped region for the dispatcher. The full-screen image and
    /// the overlay are released here. Missing capture data forces the session
    /// to `Cancelled(InvariantViolation)`.
    pub fn dispatch(&mut self) -> Result<(RgbaImage, Teardown), SessionError> {
        self.expect_state(SessionState::Confirmed, "dispatch")?;

        let crop = match (self.image.as_ref(), self.selection) {
            (Some(image), Some(rect)) => match image.crop(rect) {
                Some(crop) => crop,
                None => {
                    tracing::error!(
                        "[SESSION {}] Selection {} outside captured screen",
                        self.id,
                        rect
                    );
                    self.cancel(CancelReason::InvariantViolation);
                    return Err(SessionError::SelectionOutsideScreen(rect));
                }
            },
            (image, selection) => {
                let err = SessionError::MissingCaptureData {
                    has_image: image.is_some(),
                    has_selection: selection.is_some(),
                };
                tracing::error!("[SESSION {}] Invariant violated: {}", self.id, err);
                self.cancel(CancelReason::InvariantViolation);
                return Err(err);
            }
        };

        let teardown = self.release();
        self.state = SessionState::Recognizing;
        Ok((crop, teardown))
    }

    /// Recognizing -> Completed; failures are a normal outcome here
    pub fn complete(&mut self, result: RecognitionResult) -> Result<(), SessionError> {
        self.expect_state(SessionState::Recognizing, "complete")?;
        self.result = Some(result);
        self.state = SessionState::Completed;
        Ok(())
    }

    /// Any non-terminal state -> Cancelled; no-op once terminal
    pub fn cancel(&mut self, reason: CancelReason) -> Teardown {
        if self.is_terminal() {
            return Teardown::default();
        }

        tracing::debug!("[SESSION {}] Cancelled from {:?} ({:?})", self.id, self.state, reason);
        let teardown = self.release();
        self.selection = None;
        self.result = None;
        self.state = SessionState::Cancelled;
        self.cancel_reason = Some(reason);
        teardown
    }

    /// Release whatever is still held; safe to call any number of times
    pub fn dispose(&mut self) -> Teardown {
        self.release()
    }

    fn release(&mut self) -> Teardown {
        let teardown = Teardown {
            image: self.image.take().is_some(),
            overlay: std::mem::take(&mut self.overlay_open),
        };
        if !teardown.is_empty() {
            tracing::trace!("[SESSION {}] Released {:?}", self.id, teardown);
        }
        teardown
    }
}

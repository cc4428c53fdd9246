pub mod capture;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod postprocess;
pub mod presenter;
pub mod recognizer;
pub mod selector;
pub mod session;

pub use capture::ScreenCapturer;
pub use coordinator::{Activation, SessionCoordinator};
pub use dispatcher::RecognitionDispatcher;
pub use error::{CaptureError, SessionError};
pub use presenter::Presenter;
pub use recognizer::Recognizer;
pub use selector::{RegionSelector, Selection};
pub use session::{CancelReason, CaptureSession, SessionState, Teardown};

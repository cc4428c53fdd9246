pub mod events;
pub mod geometry;
pub mod recognition;
pub mod screen;
pub mod status;

pub use events::{ActivationSource, AppEvent, UiEvent};
pub use geometry::{MIN_SELECTION_SIZE, Point, Rectangle};
pub use recognition::{Completion, RecognitionFailure, RecognitionResult};
pub use screen::ScreenImage;
pub use status::{Activity, SessionId, StatusSnapshot};

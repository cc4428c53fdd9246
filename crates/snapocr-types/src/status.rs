use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonic identity of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse activity shown by tray/menu collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    #[default]
    Idle,
    Capturing,
    HasSelection,
    Recognizing,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Activity::Idle => "Ready for screenshot",
            Activity::Capturing => "Capturing...",
            Activity::HasSelection => "Region selected, press Enter to recognize",
            Activity::Recognizing => "Recognizing...",
        };
        f.write_str(text)
    }
}

/// Plain-data status snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub activity: Activity,
    pub session: Option<SessionId>,
    pub sessions_started: u64,
    pub recognitions_completed: u64,
    pub recognition_failures: u64,
    pub sessions_cancelled: u64,
}

use crate::status::SessionId;

/// Why a recognition attempt produced no text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionFailure {
    #[error("connection failed: is the recognition service running at {endpoint}?")]
    ConnectionFailed { endpoint: String },

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("recognition service returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("could not encode image: {0}")]
    Encode(String),

    #[error("recognition worker stopped before reporting: {0}")]
    WorkerLost(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Terminal outcome of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionResult {
    Text(String),
    Failed(RecognitionFailure),
}

impl RecognitionResult {
    pub fn text(&self) -> Option<&str> {
        match self {
            RecognitionResult::Text(text) => Some(text),
            RecognitionResult::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&RecognitionFailure> {
        match self {
            RecognitionResult::Text(_) => None,
            RecognitionResult::Failed(failure) => Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RecognitionResult::Text(_))
    }
}

impl From<Result<String, RecognitionFailure>> for RecognitionResult {
    fn from(result: Result<String, RecognitionFailure>) -> Self {
        match result {
            Ok(text) => RecognitionResult::Text(text),
            Err(failure) => RecognitionResult::Failed(failure),
        }
    }
}

/// Message posted by a recognition worker back to the UI context
#[derive(Debug, Clone)]
pub struct Completion {
    pub session: SessionId,
    pub result: RecognitionResult,
}

//! Single-active-session orchestration
//!
//! The coordinator lives on the UI context and is the only writer of session
//! state. Recognition results come back as `Completion` messages which the
//! UI loop feeds into `on_recognition_complete`.

use std::sync::Arc;

use snapocr_types::{
    ActivationSource, Activity, Completion, SessionId, StatusSnapshot, UiEvent,
};

use crate::capture::ScreenCapturer;
use crate::dispatcher::RecognitionDispatcher;
use crate::error::{CaptureError, SessionError};
use crate::presenter::Presenter;
use crate::session::{CancelReason, CaptureSession, SessionState, Teardown};

/// Outcome of an activation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Started(SessionId),
    /// Another session is still live; nothing was created
    Rejected { active: SessionId },
}

pub struct SessionCoordinator {
    active: Option<CaptureSession>,
    next_id: u64,
    min_size: i32,
    capturer: Arc<dyn ScreenCapturer>,
    dispatcher: RecognitionDispatcher,
    presenter: Box<dyn Presenter>,
    status: StatusSnapshot,
}

impl SessionCoordinator {
    pub fn new(
        capturer: Arc<dyn ScreenCapturer>,
        dispatcher: RecognitionDispatcher,
        presenter: Box<dyn Presenter>,
        min_size: i32,
    ) -> Self {
        Self {
            active: None,
            next_id: 1,
            min_size,
            capturer,
            dispatcher,
            presenter,
            status: StatusSnapshot::default(),
        }
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.active.as_ref()
    }

    /// A session exists and has not reached a terminal state
    pub fn is_busy(&self) -> bool {
        self.active.as_ref().is_some_and(|s| !s.is_terminal())
    }

    pub fn status(&self) -> StatusSnapshot {
        let mut status = self.status.clone();
        status.session = self.active.as_ref().map(|s| s.id());
        status.activity = match &self.active {
            Some(s) => match s.state() {
                SessionState::Capturing => Activity::Capturing,
                SessionState::Selecting if s.selection().is_some() => Activity::HasSelection,
                SessionState::Selecting | SessionState::Confirmed => Activity::Capturing,
                SessionState::Recognizing => Activity::Recognizing,
                SessionState::Idle | SessionState::Completed | SessionState::Cancelled => {
                    Activity::Idle
                }
            },
            None => Activity::Idle,
        };
        status
    }

    pub fn show_status(&mut self) {
        let status = self.status();
        tracing::info!("[COORD] Status: {} ({:?})", status.activity, status.session);
        self.presenter.show_status(&status);
    }

    /// Start a new session unless one is live
    ///
    /// Capture failures are returned to the caller; the application keeps
    /// running and the slot stays empty.
    pub fn activate(&mut self, source: ActivationSource) -> Result<Activation, CaptureError> {
        if let Some(live) = self.active.as_ref().filter(|s| !s.is_terminal()) {
            tracing::info!(
                "[COORD] Activation from {:?} ignored, session {} is {:?}",
                source,
                live.id(),
                live.state()
            );
            return Ok(Activation::Rejected { active: live.id() });
        }

        self.dispose_finished();

        let id = SessionId(self.next_id);
        self.next_id += 1;
        tracing::info!("[COORD] Session {} activated by {:?}", id, source);

        let mut session = CaptureSession::new(id, self.min_size);
        match session.activate(self.capturer.as_ref()) {
            // A failed capture never counts as a started session
            Ok(()) => self.status.sessions_started += 1,
            Err(SessionError::Capture(e)) => {
                tracing::error!("[COORD] Session {} capture failed: {}", id, e);
                self.presenter.capture_failed(&e);
                return Err(e);
            }
            Err(e) => {
                // A fresh session is always Idle
                tracing::error!("[COORD] Session {} could not activate: {}", id, e);
                return Err(CaptureError::Platform(e.to_string()));
            }
        }

        if let Some(screen) = session.screen() {
            self.presenter.show_overlay(id, screen);
        }
        if let Err(e) = session.present() {
            tracing::error!("[COORD] Session {} could not present: {}", id, e);
        }

        self.active = Some(session);
        Ok(Activation::Started(id))
    }

    /// Route overlay input to the live session; dropped when there is none
    pub fn handle_ui(&mut self, event: UiEvent) {
        let Some(session) = self.active.as_mut().filter(|s| !s.is_terminal()) else {
            tracing::debug!("[COORD] No live session, dropping {:?}", event);
            return;
        };
        let id = session.id();

        let outcome = match event {
            UiEvent::PointerDown(point) => session.pointer_down(point),
            UiEvent::PointerDrag(point) => session.pointer_drag(point).map(|rect| {
                if let Some(rect) = rect {
                    self.presenter
                        .selection_changed(id, rect, rect.is_valid_selection(self.min_size));
                }
            }),
            UiEvent::PointerUp(point) => session.pointer_up(point).map(|selection| {
                if let Some(selection) = selection {
                    tracing::debug!("[COORD] Session {} selection {:?}", id, selection);
                    self.presenter
                        .selection_changed(id, selection.rect(), selection.is_valid());
                }
            }),
            UiEvent::Confirm => {
                self.confirm();
                return;
            }
            UiEvent::Cancel => {
                self.cancel_active(CancelReason::User);
                return;
            }
        };

        if let Err(e) = outcome {
            tracing::debug!("[COORD] Session {} ignored {:?}: {}", id, event, e);
        }
    }

    fn confirm(&mut self) {
        let Some(session) = self.active.as_mut() else {
            return;
        };
        let id = session.id();

        match session.confirm() {
            Ok(rect) => tracing::info!("[COORD] Session {} confirmed {}", id, rect),
            Err(SessionError::NoValidSelection { candidate }) => {
                tracing::info!(
                    "[COORD] Session {} confirm rejected, selection too small: {:?}",
                    id,
                    candidate
                );
                return;
            }
            Err(e) => {
                tracing::debug!("[COORD] Session {} confirm ignored: {}", id, e);
                return;
            }
        }

        match session.dispatch() {
            Ok((crop, teardown)) => {
                self.apply_teardown(id, teardown);
                self.presenter.recognition_started(id, &crop);
                self.dispatcher.submit(id, crop);
            }
            Err(e) => {
                // The session already forced itself to Cancelled
                tracing::error!("[COORD] Session {} dispatch rejected: {}", id, e);
                self.status.sessions_cancelled += 1;
                self.presenter.hide_overlay(id);
            }
        }
    }

    /// Apply a worker's result; stale completions are dropped
    pub fn on_recognition_complete(&mut self, completion: Completion) {
        let Completion { session: id, result } = completion;

        let Some(session) = self
            .active
            .as_mut()
            .filter(|s| s.id() == id && s.state() == SessionState::Recognizing)
        else {
            tracing::debug!("[COORD] Dropping result for stale session {}", id);
            return;
        };

        if let Err(e) = session.complete(result) {
            tracing::error!("[COORD] Session {} could not complete: {}", id, e);
            return;
        }

        if let Some(result) = session.result() {
            if result.is_success() {
                self.status.recognitions_completed += 1;
            } else {
                self.status.recognition_failures += 1;
            }
            self.presenter.show_result(id, result);
        }
    }

    /// Force the live session (if any) to `Cancelled`
    pub fn cancel_active(&mut self, reason: CancelReason) {
        let Some(session) = self.active.as_mut().filter(|s| !s.is_terminal()) else {
            return;
        };
        let id = session.id();
        let teardown = session.cancel(reason);
        self.status.sessions_cancelled += 1;
        tracing::info!("[COORD] Session {} cancelled ({:?})", id, reason);
        self.apply_teardown(id, teardown);
    }

    /// Drop a terminal session; a live one is left alone
    pub fn dispose_finished(&mut self) -> Option<SessionId> {
        if self.is_busy() {
            return None;
        }
        let mut session = self.active.take()?;
        let teardown = session.dispose();
        self.apply_teardown(session.id(), teardown);
        Some(session.id())
    }

    /// Cancel anything live and release every held image
    pub fn shutdown(&mut self) {
        self.cancel_active(CancelReason::Shutdown);
        self.dispose_finished();
        tracing::info!("[COORD] Shut down");
    }

    fn apply_teardown(&mut self, id: SessionId, teardown: Teardown) {
        if teardown.overlay {
            self.presenter.hide_overlay(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use image::RgbaImage;
    use snapocr_types::{Point, RecognitionFailure, RecognitionResult, ScreenImage};
    use tokio::time::timeout;

    use super::*;
    use crate::recognizer::Recognizer;

    struct Screen;

    impl ScreenCapturer for Screen {
        fn capture(&self) -> Result<snapocr_types::ScreenImage, CaptureError> {
            Ok(ScreenImage::new(Point::new(0, 0), RgbaImage::new(320, 240)))
        }
    }

    struct Echo;

    #[async_trait::async_trait]
    impl Recognizer for Echo {
        async fn recognize(&self, png: Vec<u8>) -> Result<String, RecognitionFailure> {
            Ok(format!("{} bytes", png.len()))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[derive(Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    impl Presenter for Log {
        fn show_overlay(&mut self, session: SessionId, _screen: &ScreenImage) {
            self.0.lock().unwrap().push(format!("overlay {session}"));
        }

        fn hide_overlay(&mut self, session: SessionId) {
            self.0.lock().unwrap().push(format!("hide {session}"));
        }

        fn show_result(&mut self, session: SessionId, _result: &RecognitionResult) {
            self.0.lock().unwrap().push(format!("result {session}"));
        }
    }

    fn coordinator() -> (
        SessionCoordinator,
        kanal::AsyncReceiver<Completion>,
        Arc<Mutex<Vec<String>>>,
    ) {
        let (tx, rx) = kanal::unbounded_async();
        let log = Log::default();
        let calls = log.0.clone();
        let dispatcher = RecognitionDispatcher::new(Arc::new(Echo), tx);
        (
            SessionCoordinator::new(Arc::new(Screen), dispatcher, Box::new(log), 5),
            rx,
            calls,
        )
    }

    fn select(coord: &mut SessionCoordinator, from: (i32, i32), to: (i32, i32)) {
        coord.handle_ui(UiEvent::PointerDown(from.into()));
        coord.handle_ui(UiEvent::PointerDrag(to.into()));
        coord.handle_ui(UiEvent::PointerUp(to.into()));
    }

    #[test]
    fn test_events_without_session_are_dropped() {
        let (mut coord, _rx, calls) = coordinator();
        coord.handle_ui(UiEvent::PointerDown(Point::new(1, 1)));
        coord.handle_ui(UiEvent::Confirm);
        coord.handle_ui(UiEvent::Cancel);
        assert!(coord.session().is_none());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_status_tracks_selection() {
        let (mut coord, _rx, _) = coordinator();
        assert_eq!(coord.status().activity, Activity::Idle);

        coord.activate(ActivationSource::Tray).unwrap();
        assert_eq!(coord.status().activity, Activity::Capturing);

        select(&mut coord, (10, 10), (100, 100));
        let status = coord.status();
        assert_eq!(status.activity, Activity::HasSelection);
        assert_eq!(status.session, Some(SessionId(1)));
        assert_eq!(status.sessions_started, 1);
    }

    #[tokio::test]
    async fn test_stale_completion_is_dropped() {
        let (mut coord, rx, calls) = coordinator();
        coord.activate(ActivationSource::Hotkey).unwrap();
        select(&mut coord, (10, 10), (100, 100));
        coord.handle_ui(UiEvent::Confirm);
        assert_eq!(coord.status().activity, Activity::Recognizing);

        coord.handle_ui(UiEvent::Cancel);
        assert_eq!(coord.session().unwrap().state(), SessionState::Cancelled);

        let completion = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        coord.on_recognition_complete(completion);

        let session = coord.session().unwrap();
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.result().is_none());
        assert!(!calls.lock().unwrap().iter().any(|c| c.starts_with("result")));
        assert_eq!(coord.status().sessions_cancelled, 1);
    }

    #[tokio::test]
    async fn test_overlay_hidden_once_on_dispatch() {
        let (mut coord, rx, calls) = coordinator();
        coord.activate(ActivationSource::Hotkey).unwrap();
        select(&mut coord, (10, 10), (100, 100));
        coord.handle_ui(UiEvent::Confirm);

        let completion = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        coord.on_recognition_complete(completion);
        coord.dispose_finished();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec!["overlay #1".to_string(), "hide #1".to_string(), "result #1".to_string()]
        );
    }

    #[test]
    fn test_shutdown_releases_live_session() {
        let (mut coord, _rx, calls) = coordinator();
        coord.activate(ActivationSource::Command).unwrap();
        coord.shutdown();

        assert!(coord.session().is_none());
        assert!(!coord.is_busy());
        assert_eq!(calls.lock().unwrap().last().map(String::as_str), Some("hide #1"));
    }
}

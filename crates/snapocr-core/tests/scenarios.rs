//! End-to-end flows through the coordinator with fake platform pieces

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::time::Duration;

use image::{Rgba, RgbaImage};
use kanal::AsyncReceiver;
use snapocr_core::{
    Activation, CancelReason, CaptureError, Presenter, RecognitionDispatcher, Recognizer,
    ScreenCapturer, SessionCoordinator, SessionState,
};
use snapocr_types::{
    ActivationSource, Completion, Point, RecognitionFailure, RecognitionResult, ScreenImage,
    SessionId, UiEvent,
};
use tokio::time::timeout;

/// Each capture is filled with a different shade so snapshots can be told apart
struct CountingScreen {
    captures: AtomicUsize,
    shade: AtomicU8,
}

impl CountingScreen {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            captures: AtomicUsize::new(0),
            shade: AtomicU8::new(0),
        })
    }
}

impl ScreenCapturer for CountingScreen {
    fn capture(&self) -> Result<ScreenImage, CaptureError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        let shade = self.shade.fetch_add(1, Ordering::SeqCst);
        let pixels = RgbaImage::from_pixel(640, 480, Rgba([shade, shade, shade, 255]));
        Ok(ScreenImage::new(Point::new(0, 0), pixels))
    }
}

struct FailingScreen;

impl ScreenCapturer for FailingScreen {
    fn capture(&self) -> Result<ScreenImage, CaptureError> {
        Err(CaptureError::Platform("display server refused".into()))
    }
}

struct Fixed(Result<String, RecognitionFailure>);

#[async_trait::async_trait]
impl Recognizer for Fixed {
    async fn recognize(&self, _png: Vec<u8>) -> Result<String, RecognitionFailure> {
        self.0.clone()
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

struct Quiet;
impl Presenter for Quiet {}

fn setup(
    screen: Arc<dyn ScreenCapturer>,
    reply: Result<String, RecognitionFailure>,
) -> (SessionCoordinator, AsyncReceiver<Completion>) {
    let (tx, rx) = kanal::unbounded_async();
    let dispatcher = RecognitionDispatcher::new(Arc::new(Fixed(reply)), tx);
    (
        SessionCoordinator::new(screen, dispatcher, Box::new(Quiet), 5),
        rx,
    )
}

fn select(coord: &mut SessionCoordinator, from: (i32, i32), to: (i32, i32)) {
    coord.handle_ui(UiEvent::PointerDown(from.into()));
    coord.handle_ui(UiEvent::PointerDrag(to.into()));
    coord.handle_ui(UiEvent::PointerUp(to.into()));
}

/// Drain one completion the way the UI loop does
async fn pump(coord: &mut SessionCoordinator, rx: &AsyncReceiver<Completion>) {
    let completion = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("recognition never completed")
        .expect("completion channel closed");
    coord.on_recognition_complete(completion);
}

#[tokio::test]
async fn test_select_confirm_recognize() {
    let (mut coord, rx) = setup(CountingScreen::new(), Ok("Hello World".into()));

    assert_eq!(
        coord.activate(ActivationSource::Hotkey).unwrap(),
        Activation::Started(SessionId(1))
    );
    select(&mut coord, (10, 10), (200, 150));
    coord.handle_ui(UiEvent::Confirm);
    assert_eq!(coord.session().unwrap().state(), SessionState::Recognizing);

    pump(&mut coord, &rx).await;

    let session = coord.session().unwrap();
    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(
        session.result(),
        Some(&RecognitionResult::Text("Hello World".into()))
    );
    assert_eq!(coord.status().recognitions_completed, 1);
}

#[tokio::test]
async fn test_tiny_selection_cannot_be_confirmed() {
    let (mut coord, _rx) = setup(CountingScreen::new(), Ok("unused".into()));

    coord.activate(ActivationSource::Hotkey).unwrap();
    select(&mut coord, (10, 10), (12, 11));
    coord.handle_ui(UiEvent::Confirm);

    let session = coord.session().unwrap();
    assert_eq!(session.state(), SessionState::Selecting);
    assert!(session.selection().is_none());
    assert!(session.screen().is_some());
}

#[tokio::test]
async fn test_connection_failure_completes_session() {
    let failure = RecognitionFailure::ConnectionFailed {
        endpoint: "http://localhost:11434".into(),
    };
    let (mut coord, rx) = setup(CountingScreen::new(), Err(failure.clone()));

    coord.activate(ActivationSource::Hotkey).unwrap();
    select(&mut coord, (10, 10), (200, 150));
    coord.handle_ui(UiEvent::Confirm);
    pump(&mut coord, &rx).await;

    let session = coord.session().unwrap();
    assert_eq!(session.state(), SessionState::Completed);
    let reported = session.result().and_then(|r| r.failure()).unwrap();
    assert_eq!(reported, &failure);
    assert!(reported.to_string().starts_with("connection failed"));
    assert_eq!(coord.status().recognition_failures, 1);
}

#[tokio::test]
async fn test_cancel_then_reactivate_takes_new_snapshot() {
    let screen = CountingScreen::new();
    let (mut coord, _rx) = setup(screen.clone(), Ok("unused".into()));

    coord.activate(ActivationSource::Hotkey).unwrap();
    let first_shade = coord.session().unwrap().screen().unwrap().pixels().get_pixel(0, 0)[0];
    select(&mut coord, (10, 10), (40, 40));
    coord.handle_ui(UiEvent::Cancel);

    let session = coord.session().unwrap();
    assert_eq!(session.state(), SessionState::Cancelled);
    assert_eq!(session.cancel_reason(), Some(CancelReason::User));
    assert!(session.screen().is_none());
    assert!(session.selection().is_none());

    assert_eq!(
        coord.activate(ActivationSource::Hotkey).unwrap(),
        Activation::Started(SessionId(2))
    );
    let session = coord.session().unwrap();
    assert_eq!(session.state(), SessionState::Selecting);
    assert_eq!(screen.captures.load(Ordering::SeqCst), 2);
    assert_ne!(
        session.screen().unwrap().pixels().get_pixel(0, 0)[0],
        first_shade
    );
}

#[tokio::test]
async fn test_second_activation_is_rejected_while_live() {
    let screen = CountingScreen::new();
    let (mut coord, rx) = setup(screen.clone(), Ok("text".into()));

    coord.activate(ActivationSource::Hotkey).unwrap();
    assert_eq!(
        coord.activate(ActivationSource::Tray).unwrap(),
        Activation::Rejected {
            active: SessionId(1)
        }
    );
    assert_eq!(screen.captures.load(Ordering::SeqCst), 1);
    assert_eq!(coord.session().unwrap().state(), SessionState::Selecting);

    // Still rejected while the network call is outstanding
    select(&mut coord, (0, 0), (100, 100));
    coord.handle_ui(UiEvent::Confirm);
    assert!(matches!(
        coord.activate(ActivationSource::Hotkey).unwrap(),
        Activation::Rejected { .. }
    ));

    // Accepted again once the session is terminal
    pump(&mut coord, &rx).await;
    assert_eq!(
        coord.activate(ActivationSource::Hotkey).unwrap(),
        Activation::Started(SessionId(2))
    );
    assert_eq!(coord.status().sessions_started, 2);
}

#[tokio::test]
async fn test_capture_failure_keeps_coordinator_alive() {
    let (mut coord, _rx) = setup(Arc::new(FailingScreen), Ok("unused".into()));

    let err = coord.activate(ActivationSource::Hotkey).unwrap_err();
    assert!(err.to_string().contains("display server refused"));
    assert!(coord.session().is_none());
    assert!(!coord.is_busy());

    let status = coord.status();
    assert_eq!(status.sessions_started, 0);
    assert_eq!(status.sessions_cancelled, 0);

    // Events after a failed activation go nowhere
    coord.handle_ui(UiEvent::PointerDown(Point::new(1, 1)));
    assert!(coord.session().is_none());
}

use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use snapocr_config::Config;
use snapocr_core::postprocess::MarkdownMath;
use snapocr_core::{RecognitionDispatcher, SessionCoordinator};
use snapocr_types::{AppEvent, Completion, Rectangle, StatusSnapshot};
use snapocr_vision::{OllamaRecognizer, XcapScreen};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::io::{hotkey_listener, spawn_command_reader};
use crate::presenter::ConsolePresenter;

/// Centralized channel management
pub struct ChannelSet {
    pub app_events: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub completions: (AsyncSender<Completion>, AsyncReceiver<Completion>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_events: kanal::bounded_async(64), // hotkey, menu and overlay input
            completions: kanal::unbounded_async(), // workers must never wait on the UI
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    config: Arc<Config>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(config: Config) -> Self {
        Self {
            channels: ChannelSet::new(),
            config: Arc::new(config),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn event_sender(&self) -> AsyncSender<AppEvent> {
        self.channels.app_events.0.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Wire the real platform pieces into a coordinator
    pub fn build_coordinator(&self, script: Option<Rectangle>) -> anyhow::Result<SessionCoordinator> {
        let recognizer = OllamaRecognizer::new(&self.config.ocr)?;
        tracing::info!(
            "Recognition via {} (model {}, timeout {}s)",
            self.config.ocr.generate_url(),
            self.config.ocr.model,
            self.config.ocr.timeout_secs
        );

        let mut dispatcher =
            RecognitionDispatcher::new(Arc::new(recognizer), self.channels.completions.0.clone());
        if self.config.ocr.markdown_math {
            dispatcher = dispatcher.with_postprocessor(Arc::new(MarkdownMath));
        }

        let presenter =
            ConsolePresenter::new(self.config.ui.copy_to_clipboard, script, self.event_sender());

        Ok(SessionCoordinator::new(
            Arc::new(XcapScreen),
            dispatcher,
            Box::new(presenter),
            self.config.selection.min_size,
        ))
    }

    /// Activation sources: global hotkey and the stdin menu
    pub fn spawn_watchers(&self, with_hotkey: bool) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        if with_hotkey && self.config.hotkey.enabled {
            let accelerator = self.config.hotkey.accelerator.clone();
            let poll_interval = Duration::from_millis(self.config.hotkey.poll_interval_ms);
            let cancel = self.cancel_token.child_token();
            let tx = self.event_sender();
            tasks.spawn_blocking(move || hotkey_listener(accelerator, poll_interval, cancel, tx));
        } else {
            tracing::info!("Hotkey disabled, use the 'capture' command");
        }

        if let Err(e) = spawn_command_reader(self.event_sender()) {
            tracing::error!("Failed to start command reader: {}", e);
        }

        tasks
    }

    /// Run the UI context on the calling task until quit or cancellation
    pub async fn run(
        &self,
        coordinator: SessionCoordinator,
        exit_after_first: bool,
    ) -> anyhow::Result<StatusSnapshot> {
        event_loop(
            coordinator,
            self.channels.app_events.1.clone(),
            self.channels.completions.1.clone(),
            self.cancel_token.child_token(),
            exit_after_first,
        )
        .await
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

use kanal::AsyncReceiver;
use snapocr_core::SessionCoordinator;
use snapocr_types::{AppEvent, Completion, StatusSnapshot};
use tokio_util::sync::CancellationToken;

/// The UI context
///
/// Owns the coordinator outright; every session mutation happens on this
/// task. Workers only reach it through `completion_rx`.
pub async fn event_loop(
    mut coordinator: SessionCoordinator,
    app_rx: AsyncReceiver<AppEvent>,
    completion_rx: AsyncReceiver<Completion>,
    cancel: CancellationToken,
    exit_after_first: bool,
) -> anyhow::Result<StatusSnapshot> {
    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Cancelled");
                break;
            }
            event = app_rx.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("[EVENT_LOOP] Event channel closed: {}", e);
                        break;
                    }
                };
                tracing::debug!("[EVENT_LOOP] Event: {:?}", event);
                if !handle_event(&mut coordinator, event) {
                    break;
                }
            }
            completion = completion_rx.recv() => {
                match completion {
                    Ok(completion) => coordinator.on_recognition_complete(completion),
                    Err(e) => {
                        tracing::warn!("[EVENT_LOOP] Completion channel closed: {}", e);
                        break;
                    }
                }
            }
        }

        if exit_after_first && !coordinator.is_busy() && coordinator.status().sessions_started > 0 {
            tracing::info!("[EVENT_LOOP] First session finished, leaving");
            break;
        }
    }

    coordinator.shutdown();
    Ok(coordinator.status())
}

/// Returns `false` when the loop should stop
fn handle_event(coordinator: &mut SessionCoordinator, event: AppEvent) -> bool {
    match event {
        AppEvent::Activate(source) => {
            if let Err(e) = coordinator.activate(source) {
                tracing::error!("[EVENT_LOOP] Activation failed: {}", e);
            }
        }
        AppEvent::Ui(event) => coordinator.handle_ui(event),
        AppEvent::ShowStatus => coordinator.show_status(),
        AppEvent::Quit => {
            tracing::info!("[EVENT_LOOP] Quit requested");
            return false;
        }
    }
    true
}

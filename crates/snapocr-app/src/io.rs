use std::io::BufRead;
use std::time::Duration;

use kanal::AsyncSender;
use snapocr_types::{ActivationSource, AppEvent};
use tokio_util::sync::CancellationToken;

use crate::command::parse_command;

/// Global hotkey listener
///
/// Runs on a blocking thread and polls both the hotkey and the cancel token,
/// so shutdown is noticed within one poll interval.
pub fn hotkey_listener(
    accelerator: String,
    poll_interval: Duration,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let hotkey_manager = match snapocr_vision::HotkeyManager::from_accelerator(&accelerator) {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!("Failed to create hotkey manager: {:#}", e);
            return Err(e);
        }
    };

    tracing::info!("Capture hotkey registered ({}, id {})", accelerator, hotkey_manager.id());

    while !cancel.is_cancelled() {
        if hotkey_manager.poll() {
            tracing::info!("Capture hotkey pressed");

            match event_tx.try_send(AppEvent::Activate(ActivationSource::Hotkey)) {
                Ok(true) => {}
                Ok(false) => tracing::warn!("Event queue full, hotkey press dropped"),
                Err(e) => {
                    tracing::error!("Failed to send activation: {}", e);
                    break;
                }
            }
        }

        // Sleep briefly to avoid busy loop
        std::thread::sleep(poll_interval);
    }

    tracing::info!("Hotkey listener stopping");
    Ok(())
}

/// Read menu commands from stdin on a detached thread
///
/// Stdin reads cannot be interrupted, so the thread is not joined; it ends
/// with the process or when the event channel closes.
pub fn spawn_command_reader(event_tx: AsyncSender<AppEvent>) -> std::io::Result<()> {
    let event_tx = event_tx.to_sync();

    std::thread::Builder::new()
        .name("snapocr-commands".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Failed to read command: {}", e);
                        break;
                    }
                };

                let events = match parse_command(&line) {
                    Ok(events) => events,
                    Err(e) => {
                        tracing::warn!("{:#}", e);
                        continue;
                    }
                };

                for event in events {
                    if event_tx.send(event).is_err() {
                        tracing::debug!("Event channel closed, command reader stopping");
                        return;
                    }
                }
            }
            tracing::debug!("Stdin closed");
        })?;

    Ok(())
}

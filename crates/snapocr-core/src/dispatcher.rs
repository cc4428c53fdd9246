//! Background recognition with results marshaled back over a channel
//!
//! Workers own only the cropped image and the network call. Whatever happens
//! to them, exactly one `Completion` lands on the completion channel; the UI
//! context drains it and applies the result itself.

use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use kanal::AsyncSender;
use snapocr_types::{Completion, RecognitionFailure, RecognitionResult, SessionId};
use tokio::task::JoinHandle;

use crate::postprocess::{PlainText, Postprocessor};
use crate::recognizer::Recognizer;

#[derive(Clone)]
pub struct RecognitionDispatcher {
    recognizer: Arc<dyn Recognizer>,
    postprocessor: Arc<dyn Postprocessor>,
    completion_tx: AsyncSender<Completion>,
}

impl RecognitionDispatcher {
    pub fn new(recognizer: Arc<dyn Recognizer>, completion_tx: AsyncSender<Completion>) -> Self {
        Self {
            recognizer,
            postprocessor: Arc::new(PlainText),
            completion_tx,
        }
    }

    pub fn with_postprocessor(mut self, postprocessor: Arc<dyn Postprocessor>) -> Self {
        self.postprocessor = postprocessor;
        self
    }

    /// Schedule recognition of `image` for `session`
    ///
    /// Must be called inside a tokio runtime. Returns immediately; the handle
    /// resolves once the completion has been posted.
    pub fn submit(&self, session: SessionId, image: RgbaImage) -> JoinHandle<()> {
        let recognizer = self.recognizer.clone();
        let postprocessor = self.postprocessor.clone();
        let completion_tx = self.completion_tx.clone();

        tracing::info!(
            "[DISPATCH {}] Submitting {}x{} region to {}",
            session,
            image.width(),
            image.height(),
            recognizer.name()
        );

        tokio::spawn(async move {
            let worker = tokio::spawn(async move {
                let png = tokio::task::spawn_blocking(move || encode_png(&image))
                    .await
                    .map_err(|e| RecognitionFailure::WorkerLost(e.to_string()))??;

                tracing::debug!("[DISPATCH {}] Encoded {} bytes", session, png.len());
                recognizer.recognize(png).await
            });

            let result = match worker.await {
                Ok(Ok(text)) => {
                    tracing::info!("[DISPATCH {}] Got text: {} chars", session, text.len());
                    RecognitionResult::Text(postprocessor.process(&text))
                }
                Ok(Err(failure)) => {
                    tracing::warn!("[DISPATCH {}] Recognition failed: {}", session, failure);
                    RecognitionResult::Failed(failure)
                }
                Err(e) => {
                    tracing::error!("[DISPATCH {}] Worker error: {}", session, e);
                    RecognitionResult::Failed(RecognitionFailure::WorkerLost(e.to_string()))
                }
            };

            if let Err(e) = completion_tx.send(Completion { session, result }).await {
                tracing::warn!("[DISPATCH {}] Completion dropped, UI gone: {}", session, e);
            }
        })
    }
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RecognitionFailure> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| RecognitionFailure::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

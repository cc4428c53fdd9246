use snapocr_types::RecognitionFailure;

/// Vision-OCR backend, an opaque image-in, text-out call
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize text in a PNG-encoded image
    async fn recognize(&self, png: Vec<u8>) -> Result<String, RecognitionFailure>;

    /// Short name for logs
    fn name(&self) -> &str;
}

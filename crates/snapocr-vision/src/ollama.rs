//! Ollama `/api/generate` vision client
//!
//! One attempt per call; transport and protocol problems come back as
//! `RecognitionFailure` values rather than errors.

use std::time::Duration;

use anyhow::Context;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use snapocr_config::ocr::OcrConfig;
use snapocr_core::Recognizer;
use snapocr_types::RecognitionFailure;

#[derive(Clone)]
pub struct OllamaRecognizer {
    client: reqwest::Client,
    endpoint: String,
    url: String,
    model: String,
    prompt: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: [String; 1],
    stream: bool,
}

impl OllamaRecognizer {
    pub fn new(config: &OcrConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            url: config.generate_url(),
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn classify(&self, e: reqwest::Error) -> RecognitionFailure {
        if e.is_timeout() {
            RecognitionFailure::Timeout {
                seconds: self.timeout_secs,
            }
        } else if e.is_connect() {
            RecognitionFailure::ConnectionFailed {
                endpoint: self.endpoint.clone(),
            }
        } else if e.is_decode() {
            RecognitionFailure::UnexpectedResponse(e.to_string())
        } else {
            RecognitionFailure::Request(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl Recognizer for OllamaRecognizer {
    async fn recognize(&self, png: Vec<u8>) -> Result<String, RecognitionFailure> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: &self.prompt,
            images: [STANDARD.encode(&png)],
            stream: false,
        };

        tracing::debug!(">>> [OCR] POST {} ({} model)", self.url, self.model);
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecognitionFailure::HttpStatus {
                status: status.as_u16(),
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| self.classify(e))?;

        json["response"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                RecognitionFailure::UnexpectedResponse("no 'response' text in reply".to_string())
            })
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    use super::*;

    fn config(endpoint: String) -> OcrConfig {
        OcrConfig {
            endpoint,
            model: "test-model".to_string(),
            timeout_secs: 1,
            ..OcrConfig::default()
        }
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let length = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Answer exactly one request with a canned response
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen_tx, seen_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            let _ = seen_tx.send(request);
        });

        (format!("http://{addr}"), seen_rx)
    }

    #[tokio::test]
    async fn test_success_returns_response_text() {
        let (url, seen) = serve_once("200 OK", r#"{"model":"test-model","response":"Hello World","done":true}"#).await;
        let recognizer = OllamaRecognizer::new(&config(url)).unwrap();

        let text = recognizer.recognize(vec![1, 2, 3]).await.unwrap();
        assert_eq!(text, "Hello World");

        let request = seen.await.unwrap();
        assert!(request.starts_with("POST /api/generate"));
        assert!(request.contains(r#""model":"test-model""#));
        assert!(request.contains(r#""images":["AQID"]"#));
        assert!(request.contains(r#""stream":false"#));
    }

    #[tokio::test]
    async fn test_non_200_is_http_status() {
        let (url, _seen) = serve_once("500 Internal Server Error", r#"{"error":"model not found"}"#).await;
        let recognizer = OllamaRecognizer::new(&config(url)).unwrap();

        let err = recognizer.recognize(vec![0]).await.unwrap_err();
        assert_eq!(err, RecognitionFailure::HttpStatus { status: 500 });
    }

    #[tokio::test]
    async fn test_missing_response_field() {
        let (url, _seen) = serve_once("200 OK", r#"{"done":true}"#).await;
        let recognizer = OllamaRecognizer::new(&config(url)).unwrap();

        let err = recognizer.recognize(vec![0]).await.unwrap_err();
        assert!(matches!(err, RecognitionFailure::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let recognizer = OllamaRecognizer::new(&config(url.clone())).unwrap();
        let err = recognizer.recognize(vec![0]).await.unwrap_err();
        assert_eq!(err, RecognitionFailure::ConnectionFailed { endpoint: url });
        assert!(err.to_string().starts_with("connection failed"));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let recognizer = OllamaRecognizer::new(&config(url)).unwrap();
        let err = recognizer.recognize(vec![0]).await.unwrap_err();
        assert_eq!(err, RecognitionFailure::Timeout { seconds: 1 });
    }
}

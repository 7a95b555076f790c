//! Ollama chat client with streamed responses

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use mmrag_core::{ChatRequest, Error, GenerationBackend, Result, TokenStream};

use crate::config::OllamaConfig;

/// Streaming client for the Ollama `/api/chat` endpoint
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

#[derive(Deserialize)]
struct StreamMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    message: Option<StreamMessage>,
    #[serde(default)]
    error: Option<String>,
}

impl OllamaClient {
    /// Create a new client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        config.validate()?;

        // Idle timeout only: a long answer may stream for longer than timeout_secs
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn stream_chat(&self, request: ChatRequest) -> Result<TokenStream> {
        let response = self
            .client
            .post(self.config.chat_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Generation(format!(
                "Ollama request failed with status {}: {}",
                status, error_text
            )));
        }

        let (tx, rx) = TokenStream::channel();
        let mut body = response.bytes_stream();

        let producer = tokio::spawn(async move {
            let mut lines = LineBuffer::default();
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => {
                        for line in lines.push(&bytes) {
                            if !forward_line(&tx, &line).await {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "generation stream interrupted");
                        let _ = tx.send(Err(Error::Network(e.to_string()))).await;
                        return;
                    }
                }
            }
            if let Some(line) = lines.finish() {
                forward_line(&tx, &line).await;
            }
        });

        Ok(TokenStream::new(rx, producer))
    }

    async fn stream_multimodal(&self, prompt: &str, image_paths: &[PathBuf]) -> Result<TokenStream> {
        let mut images = Vec::with_capacity(image_paths.len());
        for path in image_paths {
            let bytes = tokio::fs::read(path).await?;
            images.push(STANDARD.encode(bytes));
        }
        debug!(images = images.len(), "sending multimodal chat request");
        self.stream_chat(ChatRequest::user_multimodal(
            &self.config.model,
            prompt,
            images,
        ))
        .await
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

/// Decode one line and pass any fragment on. Returns false once the consumer is gone.
async fn forward_line(tx: &mpsc::Sender<Result<String>>, line: &str) -> bool {
    match decode_stream_line(line) {
        Ok(Some(fragment)) => tx.send(Ok(fragment)).await.is_ok(),
        Ok(None) => true,
        Err(Error::StreamDecode(reason)) => {
            debug!(%reason, "skipping malformed stream line");
            true
        }
        Err(e) => tx.send(Err(e)).await.is_ok(),
    }
}

/// Decode a single response line into a text fragment.
///
/// Blank lines and lines without `message.content` yield `None`. An
/// `error` field becomes a generation error; anything unparseable is a
/// `StreamDecode` error the caller may skip.
pub fn decode_stream_line(line: &str) -> Result<Option<String>> {
    let line = line.trim();
    let line = line.strip_prefix("data:").map(str::trim_start).unwrap_or(line);

    if line.is_empty() || line == "[DONE]" {
        return Ok(None);
    }

    let chunk: StreamChunk = serde_json::from_str(line)
        .map_err(|e| Error::StreamDecode(format!("{}: {}", e, line)))?;

    if let Some(error) = chunk.error {
        return Err(Error::Generation(error));
    }

    Ok(chunk
        .message
        .and_then(|m| m.content)
        .filter(|content| !content.is_empty()))
}

/// Reassembles newline-delimited lines from arbitrary network chunks
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append a chunk and return every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// Remaining text after the last newline, if any
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        let rest = String::from_utf8_lossy(&rest).into_owned();
        (!rest.trim().is_empty()).then_some(rest)
    }
}

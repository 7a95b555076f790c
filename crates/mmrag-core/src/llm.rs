//! Generation backend trait and the streamed token channel

use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::Result;

/// Capacity of the fragment channel between producer and consumer
pub const TOKEN_CHANNEL_CAPACITY: usize = 64;

/// Body of a streaming chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// Single user message with plain text content
    pub fn user_text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Text(prompt.into()),
            }],
            stream: true,
        }
    }

    /// Single user message with a text part followed by base64 image parts
    pub fn user_multimodal(
        model: impl Into<String>,
        prompt: impl Into<String>,
        images_base64: Vec<String>,
    ) -> Self {
        let mut parts = vec![ContentPart::Text { text: prompt.into() }];
        parts.extend(images_base64.into_iter().map(|data| ContentPart::Image { data }));
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Parts(parts),
            }],
            stream: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    Image { data: String },
}

/// Incremental text fragments from a generation backend.
///
/// Fragments arrive over a bounded channel fed by a producer task.
/// Dropping the stream or calling [`TokenStream::cancel`] aborts the
/// producer, which closes the underlying connection.
pub struct TokenStream {
    receiver: mpsc::Receiver<Result<String>>,
    producer: Option<JoinHandle<()>>,
}

impl TokenStream {
    /// Create a channel pair. The sender side feeds the stream.
    pub fn channel() -> (mpsc::Sender<Result<String>>, mpsc::Receiver<Result<String>>) {
        mpsc::channel(TOKEN_CHANNEL_CAPACITY)
    }

    /// Wrap a receiver and the task producing into it
    pub fn new(receiver: mpsc::Receiver<Result<String>>, producer: JoinHandle<()>) -> Self {
        Self {
            receiver,
            producer: Some(producer),
        }
    }

    /// Wrap a receiver whose producer is owned elsewhere
    pub fn from_receiver(receiver: mpsc::Receiver<Result<String>>) -> Self {
        Self {
            receiver,
            producer: None,
        }
    }

    /// Next fragment, or `None` once the producer has finished
    pub async fn next_fragment(&mut self) -> Option<Result<String>> {
        self.receiver.recv().await
    }

    /// Abort the producer and stop receiving
    pub fn cancel(mut self) {
        self.abort_producer();
    }

    /// Drain every remaining fragment into one string
    pub async fn collect_text(mut self) -> Result<String> {
        let mut out = String::new();
        while let Some(fragment) = self.next_fragment().await {
            out.push_str(&fragment?);
        }
        Ok(out)
    }

    fn abort_producer(&mut self) {
        self.receiver.close();
        if let Some(handle) = self.producer.take() {
            handle.abort();
        }
    }
}

impl Stream for TokenStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for TokenStream {
    fn drop(&mut self) {
        self.abort_producer();
    }
}

/// Trait for streaming text-completion backends
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Send a chat request and stream the answer back
    async fn stream_chat(&self, request: ChatRequest) -> Result<TokenStream>;

    /// Stream an answer to a prompt with image files attached
    async fn stream_multimodal(&self, prompt: &str, image_paths: &[PathBuf]) -> Result<TokenStream>;

    /// Stream an answer to a text-only prompt
    async fn stream_text(&self, prompt: &str) -> Result<TokenStream> {
        self.stream_chat(ChatRequest::user_text(self.model_id(), prompt))
            .await
    }

    /// Model used for generation
    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_text_request_shape() {
        let request = ChatRequest::user_text("gemma3:4b", "hi");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gemma3:4b",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": true
            })
        );
    }

    #[test]
    fn test_multimodal_request_shape() {
        let request = ChatRequest::user_multimodal("gemma3:4b", "what is this", vec!["QUJD".into()]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["messages"][0]["content"],
            serde_json::json!([
                {"type": "text", "text": "what is this"},
                {"type": "image", "data": "QUJD"}
            ])
        );
    }

    #[tokio::test]
    async fn test_token_stream_yields_in_order() {
        let (tx, rx) = TokenStream::channel();
        let producer = tokio::spawn(async move {
            for fragment in ["Hel", "lo", "!"] {
                if tx.send(Ok(fragment.to_string())).await.is_err() {
                    return;
                }
            }
        });
        let stream = TokenStream::new(rx, producer);
        let fragments: Vec<String> = stream.map(|f| f.unwrap()).collect().await;
        assert_eq!(fragments, vec!["Hel", "lo", "!"]);
    }

    #[tokio::test]
    async fn test_cancel_stops_producer() {
        let (tx, rx) = TokenStream::channel();
        let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
        let producer = tokio::spawn(async move {
            let _guard = done_tx;
            loop {
                if tx.send(Ok("x".to_string())).await.is_err() {
                    return;
                }
            }
        });
        let mut stream = TokenStream::new(rx, producer);
        assert!(stream.next_fragment().await.is_some());
        stream.cancel();
        // The oneshot sender is dropped once the producer task ends.
        assert!(done_rx.await.is_err());
    }
}

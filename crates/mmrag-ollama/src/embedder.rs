//! Text embeddings from the Ollama `/api/embed` endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use mmrag_core::{EmbeddingVector, Error, Result, TextEmbedder};

use crate::config::OllamaConfig;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Text embedder backed by an Ollama embedding model
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: config.embed_url(),
            model: config.embed_model.clone(),
            dimension: config.embed_dimension,
        })
    }
}

#[async_trait]
impl TextEmbedder for OllamaEmbedder {
    async fn embed_text(&self, text: &str) -> Result<EmbeddingVector> {
        if text.trim().is_empty() {
            return Err(Error::Embedding("cannot embed empty text".to_string()));
        }

        let response = self
            .client
            .post(&self.url)
            .json(&EmbedRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Embedding(format!(
                "Ollama embed request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let vector = body
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Ollama returned no embeddings".to_string()))?;

        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

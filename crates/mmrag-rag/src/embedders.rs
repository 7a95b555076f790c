//! Local embedding providers
//!
//! Both providers run in-process and need no model files. The hashed text
//! embedder uses a seeded xxHash so a persisted corpus stays comparable with
//! query vectors produced by a later process.

use async_trait::async_trait;
use image::DynamicImage;
use image::imageops::FilterType;
use std::hash::Hasher;
use twox_hash::XxHash64;

use mmrag_core::{EmbeddingVector, Error, ImageEmbedder, Result, TextEmbedder};

/// Feature-hashing text embedder over words and bigrams
pub struct HashedTextEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashedTextEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_id: format!("hashed-bow-{}", dimension),
        }
    }

    fn bucket(&self, hash: u64) -> usize {
        (hash % self.dimension as u64) as usize
    }

    fn generate(&self, text: &str) -> EmbeddingVector {
        let normalized = text.to_lowercase();
        let words: Vec<&str> = normalized.split_whitespace().collect();

        let mut embedding = vec![0.0f32; self.dimension];

        for (pos, word) in words.iter().enumerate() {
            let hash = stable_hash(word.as_bytes());

            // Earlier words weigh more
            let position_weight = 1.0 / (pos as f32 + 1.0);

            embedding[self.bucket(hash)] += position_weight;
            embedding[self.bucket(hash >> 16)] += position_weight * 0.7;
            embedding[self.bucket(hash >> 32)] += position_weight * 0.5;
        }

        for pair in words.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            let hash = stable_hash(bigram.as_bytes());
            embedding[self.bucket(hash)] += 0.8;
        }

        l2_normalize(&mut embedding);
        embedding
    }
}

impl Default for HashedTextEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl TextEmbedder for HashedTextEmbedder {
    async fn embed_text(&self, text: &str) -> Result<EmbeddingVector> {
        if text.trim().is_empty() {
            return Err(Error::Embedding("cannot embed empty text".to_string()));
        }
        Ok(self.generate(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Image embedder that flattens a fixed-size RGB thumbnail
pub struct ThumbnailImageEmbedder {
    side: u32,
    model_id: String,
}

impl ThumbnailImageEmbedder {
    pub fn new(side: u32) -> Self {
        Self {
            side,
            model_id: format!("thumbnail-{}", side),
        }
    }
}

impl Default for ThumbnailImageEmbedder {
    fn default() -> Self {
        Self::new(16)
    }
}

#[async_trait]
impl ImageEmbedder for ThumbnailImageEmbedder {
    async fn embed_image(&self, image: &DynamicImage) -> Result<EmbeddingVector> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::Embedding("cannot embed an empty image".to_string()));
        }

        let thumbnail = image
            .resize_exact(self.side, self.side, FilterType::Triangle)
            .to_rgb8();

        let mut embedding: EmbeddingVector = thumbnail
            .as_raw()
            .iter()
            .map(|&channel| channel as f32 / 255.0)
            .collect();

        l2_normalize(&mut embedding);
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        (self.side * self.side * 3) as usize
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn stable_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

fn l2_normalize(values: &mut [f32]) {
    let magnitude: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in values.iter_mut() {
            *value /= magnitude;
        }
    }
}

//! Embedding provider traits

use async_trait::async_trait;
use image::DynamicImage;

use crate::Result;

/// Dense embedding produced by a provider
pub type EmbeddingVector = Vec<f32>;

/// Maps text to a fixed-length vector.
///
/// Implementations must be deterministic for identical input within a
/// process lifetime and always return `dimension()` values. Callers are
/// expected not to pass empty text.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed a single text
    async fn embed_text(&self, text: &str) -> Result<EmbeddingVector>;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model
    fn model_id(&self) -> &str;
}

/// Maps a decoded image to a fixed-length vector.
#[async_trait]
pub trait ImageEmbedder: Send + Sync {
    /// Embed a single decoded image
    async fn embed_image(&self, image: &DynamicImage) -> Result<EmbeddingVector>;

    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model
    fn model_id(&self) -> &str;
}

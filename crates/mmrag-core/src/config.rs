//! Retrieval configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::{Error, Result};
use crate::vector_store::DEFAULT_TOP_K;

/// Settings shared by ingestion and retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Directory scanned by corpus ingestion
    pub docs_dir: PathBuf,
    /// Directory holding the persisted index pair
    pub vectorstore_dir: PathBuf,
    /// Neighbours returned per search
    pub top_k: usize,
    /// Output length of the local text embedder
    pub text_dimension: usize,
    /// Thumbnail side used by the local image embedder
    pub image_side: u32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("data/documents"),
            vectorstore_dir: PathBuf::from("vectorstore"),
            top_k: DEFAULT_TOP_K,
            text_dimension: 384,
            image_side: 16,
        }
    }
}

impl RagConfig {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let docs_dir = env::var("MMRAG_DOCS_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.docs_dir);

        let vectorstore_dir = env::var("MMRAG_VECTORSTORE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.vectorstore_dir);

        let top_k = parse_var("MMRAG_TOP_K")?.unwrap_or(defaults.top_k);
        let text_dimension = parse_var("MMRAG_TEXT_DIM")?.unwrap_or(defaults.text_dimension);
        let image_side = parse_var("MMRAG_IMAGE_SIDE")?.unwrap_or(defaults.image_side);

        let config = Self {
            docs_dir,
            vectorstore_dir,
            top_k,
            text_dimension,
            image_side,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every search or embedding meaningless
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::Configuration("top_k must be at least 1".to_string()));
        }
        if self.text_dimension == 0 {
            return Err(Error::Configuration(
                "text embedding dimension must be at least 1".to_string(),
            ));
        }
        if self.image_side == 0 {
            return Err(Error::Configuration("image side must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Configuration(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

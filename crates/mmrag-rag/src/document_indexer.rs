//! Per-file processing shared by corpus ingestion and session uploads

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use mmrag_core::{
    DocumentRecord, EmbeddingVector, Error, FileClass, ImageEmbedder, Result, TextEmbedder,
};

use crate::extract::{PdfExtractText, PdfExtractor, decode_image};

/// Outcome of processing one file
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedDocument {
    Text {
        vector: EmbeddingVector,
        record: DocumentRecord,
    },
    Image {
        vector: EmbeddingVector,
        record: DocumentRecord,
    },
    /// Extraction produced nothing but whitespace
    EmptyText,
    /// Extension is neither PDF nor a supported image
    Unsupported,
}

/// Classifies, extracts and embeds single files
#[derive(Clone)]
pub struct DocumentProcessor {
    text_embedder: Arc<dyn TextEmbedder>,
    image_embedder: Arc<dyn ImageEmbedder>,
    pdf_extractor: Arc<dyn PdfExtractor>,
}

impl DocumentProcessor {
    pub fn new(text_embedder: Arc<dyn TextEmbedder>, image_embedder: Arc<dyn ImageEmbedder>) -> Self {
        Self {
            text_embedder,
            image_embedder,
            pdf_extractor: Arc::new(PdfExtractText),
        }
    }

    /// Replace the PDF text extractor
    pub fn with_pdf_extractor(mut self, pdf_extractor: Arc<dyn PdfExtractor>) -> Self {
        self.pdf_extractor = pdf_extractor;
        self
    }

    pub fn text_embedder(&self) -> &Arc<dyn TextEmbedder> {
        &self.text_embedder
    }

    pub fn image_embedder(&self) -> &Arc<dyn ImageEmbedder> {
        &self.image_embedder
    }

    /// Process one file. Any failure is reported as an `IngestionItem` error
    /// naming the file so the caller can skip it and continue.
    pub async fn process(&self, name: &str, bytes: &[u8]) -> Result<ProcessedDocument> {
        self.process_inner(name, bytes)
            .await
            .map_err(|e| Error::ingestion_item(name, e))
    }

    async fn process_inner(&self, name: &str, bytes: &[u8]) -> Result<ProcessedDocument> {
        match FileClass::from_name(name) {
            FileClass::Pdf => {
                let text = self.pdf_extractor.extract_text(bytes)?;
                if text.trim().is_empty() {
                    debug!(source = name, "no text extracted");
                    return Ok(ProcessedDocument::EmptyText);
                }
                let vector = self.embed_text(&text).await?;
                Ok(ProcessedDocument::Text {
                    vector,
                    record: DocumentRecord::text(name, text),
                })
            }
            FileClass::Image => {
                let image = decode_image(bytes)?;
                let vector = self.embed_image(&image).await?;
                Ok(ProcessedDocument::Image {
                    vector,
                    record: DocumentRecord::image(name),
                })
            }
            FileClass::Unsupported => Ok(ProcessedDocument::Unsupported),
        }
    }

    /// Embed text and check the provider honoured its declared dimension
    pub async fn embed_text(&self, text: &str) -> Result<EmbeddingVector> {
        let vector = self.text_embedder.embed_text(text).await?;
        check_dimension(self.text_embedder.dimension(), &vector)?;
        Ok(vector)
    }

    /// Embed an image and check the provider honoured its declared dimension
    pub async fn embed_image(&self, image: &image::DynamicImage) -> Result<EmbeddingVector> {
        let vector = self.image_embedder.embed_image(image).await?;
        check_dimension(self.image_embedder.dimension(), &vector)?;
        Ok(vector)
    }
}

fn check_dimension(expected: usize, vector: &[f32]) -> Result<()> {
    if vector.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

/// A file that could not be ingested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionFailure {
    pub source: String,
    pub reason: String,
}

/// Summary of one ingestion pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub text_indexed: usize,
    pub images_indexed: usize,
    /// Files skipped because of their extension or empty text
    pub skipped: Vec<String>,
    pub failures: Vec<IngestionFailure>,
}

impl IngestionReport {
    pub(crate) fn record_failure(&mut self, error: Error) {
        let failure = match error {
            Error::IngestionItem {
                source_name,
                reason,
            } => IngestionFailure {
                source: source_name,
                reason,
            },
            other => IngestionFailure {
                source: String::new(),
                reason: other.to_string(),
            },
        };
        self.failures.push(failure);
    }
}

//! In-memory indexes built from a single request's uploads

use tracing::{debug, warn};

use mmrag_core::{DocumentRecord, EmbeddingVector, Result, UploadedFile};

use crate::document_indexer::{DocumentProcessor, ProcessedDocument};
use crate::vector_index::VectorIndex;

/// Vectors and records collected from uploads, one pair of lists per modality
#[derive(Debug, Clone, Default)]
pub struct EphemeralCollections {
    pub text_vectors: Vec<EmbeddingVector>,
    pub text_records: Vec<DocumentRecord>,
    pub image_vectors: Vec<EmbeddingVector>,
    pub image_records: Vec<DocumentRecord>,
}

/// Transient indexes for one retrieval call
#[derive(Debug, Clone, Default)]
pub struct EphemeralIndexes {
    pub text: Option<VectorIndex>,
    pub image: Option<VectorIndex>,
}

impl EphemeralCollections {
    pub fn is_empty(&self) -> bool {
        self.text_records.is_empty() && self.image_records.is_empty()
    }

    /// Build an index for each modality that has at least one vector
    pub fn into_indexes(self) -> Result<EphemeralIndexes> {
        Ok(EphemeralIndexes {
            text: build_index(self.text_vectors, self.text_records)?,
            image: build_index(self.image_vectors, self.image_records)?,
        })
    }
}

fn build_index(
    vectors: Vec<EmbeddingVector>,
    records: Vec<DocumentRecord>,
) -> Result<Option<VectorIndex>> {
    let Some(dimension) = vectors.first().map(Vec::len) else {
        return Ok(None);
    };
    VectorIndex::from_parts(dimension, vectors, records).map(Some)
}

/// Runs the ingestion per-file algorithm over uploaded files
pub struct EphemeralIndexBuilder {
    processor: DocumentProcessor,
}

impl EphemeralIndexBuilder {
    pub fn new(processor: DocumentProcessor) -> Self {
        Self { processor }
    }

    /// Classify, extract and embed every upload. Bad uploads are skipped.
    pub async fn collect(&self, uploads: &[UploadedFile]) -> EphemeralCollections {
        let mut collections = EphemeralCollections::default();

        for upload in uploads {
            match self.processor.process(&upload.name, &upload.bytes).await {
                Ok(ProcessedDocument::Text { vector, record }) => {
                    collections.text_vectors.push(vector);
                    collections.text_records.push(record);
                }
                Ok(ProcessedDocument::Image { vector, record }) => {
                    collections.image_vectors.push(vector);
                    collections.image_records.push(record);
                }
                Ok(ProcessedDocument::EmptyText) | Ok(ProcessedDocument::Unsupported) => {
                    debug!(source = %upload.name, "upload not indexed");
                }
                Err(e) => warn!(error = %e, "skipping upload"),
            }
        }

        debug!(
            text = collections.text_records.len(),
            images = collections.image_records.len(),
            "collected session uploads"
        );
        collections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{counting_processor, png_bytes, stub_pdf};

    #[tokio::test]
    async fn test_collect_splits_by_modality() {
        let (processor, _, _) = counting_processor();
        let uploads = vec![
            UploadedFile::new("notes.pdf", stub_pdf("cat care notes")),
            UploadedFile::new("cat.png", png_bytes([90, 90, 90])),
            UploadedFile::new("empty.pdf", stub_pdf("  ")),
            UploadedFile::new("song.mp3", vec![1, 2, 3]),
            UploadedFile::new("broken.jpg", b"nope".to_vec()),
        ];

        let collections = EphemeralIndexBuilder::new(processor).collect(&uploads).await;
        assert_eq!(collections.text_vectors.len(), 1);
        assert_eq!(collections.text_records[0].source, "notes.pdf");
        assert_eq!(collections.image_vectors.len(), 1);
        assert_eq!(collections.image_records[0].source, "cat.png");
    }

    #[tokio::test]
    async fn test_index_only_built_for_populated_modality() {
        let (processor, _, _) = counting_processor();
        let uploads = vec![UploadedFile::new("notes.pdf", stub_pdf("cat care notes"))];

        let indexes = EphemeralIndexBuilder::new(processor)
            .collect(&uploads)
            .await
            .into_indexes()
            .unwrap();

        assert_eq!(indexes.text.as_ref().map(VectorIndex::len), Some(1));
        assert!(indexes.image.is_none());
    }

    #[test]
    fn test_empty_collections_build_nothing() {
        let collections = EphemeralCollections::default();
        assert!(collections.is_empty());
        let indexes = collections.into_indexes().unwrap();
        assert!(indexes.text.is_none() && indexes.image.is_none());
    }
}

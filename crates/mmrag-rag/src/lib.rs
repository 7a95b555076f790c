//! Retrieval core for the multimodal RAG assistant
//!
//! This crate provides the exact vector index and its on-disk format, local
//! embedders, corpus ingestion, per-request upload indexes and the retrieval
//! orchestrator that merges them into a grounded prompt.

mod corpus;
mod document_indexer;
mod embedders;
mod ephemeral;
mod extract;
mod prompt;
mod retrieval;
mod store;
mod vector_index;

#[cfg(test)]
mod test_support;

pub use corpus::{CorpusBuild, CorpusBuilder};
pub use document_indexer::{
    DocumentProcessor, IngestionFailure, IngestionReport, ProcessedDocument,
};
pub use embedders::{HashedTextEmbedder, ThumbnailImageEmbedder};
pub use ephemeral::{EphemeralCollections, EphemeralIndexBuilder, EphemeralIndexes};
pub use extract::{PdfExtractText, PdfExtractor, decode_image};
pub use prompt::compose_prompt;
pub use retrieval::RetrievalEngine;
pub use store::{IndexPair, index_path, metadata_path, remove_persisted};
pub use vector_index::VectorIndex;

// Re-export core types for convenience
pub use mmrag_core::{
    DocumentKind, DocumentRecord, Error, QueryInput, Result, RetrievalOutcome, SearchHit,
    UploadedFile,
};

//! Core traits and types for the multimodal RAG assistant
//!
//! This crate defines the error taxonomy, the document data model, configuration,
//! and the capability-facing interfaces for embedding providers and generation
//! backends, so retrieval code can be exercised with local fakes.

pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod rag;
pub mod types;
pub mod vector_store;

#[cfg(test)]
mod tests;

pub use config::RagConfig;
pub use embedding::{EmbeddingVector, ImageEmbedder, TextEmbedder};
pub use error::{Error, Result};
pub use llm::{ChatMessage, ChatRequest, ContentPart, GenerationBackend, MessageContent, TokenStream};
pub use rag::{
    DocumentOrigin, QueryInput, RetrievalOutcome, RetrievalPhase, RetrievalQuery,
    RetrievedDocument,
};
pub use types::{DocumentKind, DocumentRecord, FileClass, UploadedFile};
pub use vector_store::{DEFAULT_TOP_K, SearchHit, squared_l2};

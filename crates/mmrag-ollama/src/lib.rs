//! Ollama integration for the multimodal RAG assistant
//!
//! This crate provides the streaming chat client implementing
//! `GenerationBackend` and an embedding-model-backed `TextEmbedder`.

mod client;
mod config;
mod embedder;


pub use client::{LineBuffer, OllamaClient, decode_stream_line};
pub use config::OllamaConfig;
pub use embedder::OllamaEmbedder;

// Re-export core types for convenience
pub use mmrag_core::{ChatRequest, Error, GenerationBackend, Result, TokenStream};

//! Process-wide application state

use std::env;
use std::sync::Arc;

use clap::ValueEnum;
use tracing::info;

use mmrag_core::{Error, GenerationBackend, ImageEmbedder, RagConfig, Result, TextEmbedder};
use mmrag_ollama::{OllamaClient, OllamaConfig, OllamaEmbedder};
use mmrag_rag::{
    CorpusBuilder, DocumentProcessor, HashedTextEmbedder, IndexPair, IngestionReport,
    RetrievalEngine, ThumbnailImageEmbedder,
};

/// Which provider embeds text for ingestion and queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TextEmbedderKind {
    /// In-process feature hashing
    #[default]
    Hashed,
    /// Ollama `/api/embed`
    Ollama,
}

/// Everything needed to build the application state
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub rag: RagConfig,
    pub ollama: OllamaConfig,
    pub text_embedder: TextEmbedderKind,
}

impl AppSettings {
    /// Read settings from the environment (and `.env`)
    pub fn from_env() -> Result<Self> {
        let rag = RagConfig::from_env()?;
        let ollama = OllamaConfig::from_env()?;

        let text_embedder = match env::var("MMRAG_TEXT_EMBEDDER") {
            Ok(raw) => TextEmbedderKind::from_str(raw.trim(), true).map_err(|_| {
                Error::Configuration(format!("MMRAG_TEXT_EMBEDDER has an invalid value: {}", raw))
            })?,
            Err(_) => TextEmbedderKind::default(),
        };

        Ok(Self {
            rag,
            ollama,
            text_embedder,
        })
    }

    /// Build the per-file processor shared by ingestion and retrieval
    pub fn build_processor(&self) -> Result<DocumentProcessor> {
        let text_embedder: Arc<dyn TextEmbedder> = match self.text_embedder {
            TextEmbedderKind::Hashed => Arc::new(HashedTextEmbedder::new(self.rag.text_dimension)),
            TextEmbedderKind::Ollama => Arc::new(OllamaEmbedder::new(&self.ollama)?),
        };
        let image_embedder = Arc::new(ThumbnailImageEmbedder::new(self.rag.image_side));

        info!(
            text_model = text_embedder.model_id(),
            image_model = image_embedder.model_id(),
            "embedding providers ready"
        );
        Ok(DocumentProcessor::new(text_embedder, image_embedder))
    }
}

/// Run a full ingestion pass over the configured document directory
pub async fn run_ingestion(settings: &AppSettings) -> Result<IngestionReport> {
    let processor = settings.build_processor()?;
    CorpusBuilder::new(processor)
        .ingest(&settings.rag.docs_dir, &settings.rag.vectorstore_dir)
        .await
}

/// Long-lived state of a serving process, created once at startup
pub struct AppState {
    engine: RetrievalEngine,
    backend: Arc<dyn GenerationBackend>,
}

impl AppState {
    /// Load the persisted corpus and connect the providers.
    ///
    /// Fails if either persisted index is missing, corrupt, or was built with
    /// an embedder of a different dimension.
    pub fn initialize(settings: &AppSettings) -> Result<Self> {
        let processor = settings.build_processor()?;
        let persisted = IndexPair::load(&settings.rag.vectorstore_dir)?;
        let backend = Arc::new(OllamaClient::new(settings.ollama.clone())?);

        let state = Self::from_parts(settings.rag.clone(), persisted, processor, backend)?;
        info!(model = state.backend.model_id(), "application state initialized");
        Ok(state)
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: RagConfig,
        persisted: IndexPair,
        processor: DocumentProcessor,
        backend: Arc<dyn GenerationBackend>,
    ) -> Result<Self> {
        check_dimension("text", persisted.text.dimension(), processor.text_embedder().dimension())?;
        check_dimension("image", persisted.image.dimension(), processor.image_embedder().dimension())?;

        let engine = RetrievalEngine::new(Arc::new(persisted), processor).with_top_k(config.top_k);
        Ok(Self { engine, backend })
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    pub fn backend(&self) -> &dyn GenerationBackend {
        self.backend.as_ref()
    }

    /// Log teardown, then drop the engine (indexes, embedders) and the backend handle
    pub fn shutdown(self) {
        let Self { engine, backend } = self;
        let persisted = engine.persisted();
        info!(
            text_entries = persisted.text.len(),
            image_entries = persisted.image.len(),
            model = backend.model_id(),
            "shutting down"
        );
        drop(engine);
        drop(backend);
    }
}

fn check_dimension(modality: &str, index: usize, embedder: usize) -> Result<()> {
    if index != embedder {
        return Err(Error::Configuration(format!(
            "persisted {} index has dimension {} but the embedder produces {}; re-run ingestion",
            modality, index, embedder
        )));
    }
    Ok(())
}

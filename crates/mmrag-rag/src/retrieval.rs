//! Retrieval orchestration over the persisted and per-request indexes

use std::sync::Arc;

use tracing::debug;

use mmrag_core::{
    DEFAULT_TOP_K, DocumentOrigin, EmbeddingVector, QueryInput, Result, RetrievalOutcome,
    RetrievalPhase, RetrievalQuery, RetrievedDocument, SearchHit, UploadedFile,
};

use crate::document_indexer::DocumentProcessor;
use crate::ephemeral::{EphemeralIndexBuilder, EphemeralIndexes};
use crate::prompt::compose_prompt;
use crate::store::IndexPair;

/// Runs one query cycle: classify, search the corpus, search uploads, merge
pub struct RetrievalEngine {
    persisted: Arc<IndexPair>,
    processor: DocumentProcessor,
    ephemeral: EphemeralIndexBuilder,
    top_k: usize,
}

impl RetrievalEngine {
    pub fn new(persisted: Arc<IndexPair>, processor: DocumentProcessor) -> Self {
        Self {
            persisted,
            ephemeral: EphemeralIndexBuilder::new(processor.clone()),
            processor,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn persisted(&self) -> &IndexPair {
        &self.persisted
    }

    /// Retrieve documents for `input`, merging in any `uploads` for this turn.
    ///
    /// Result order is fixed: persisted hits, then ephemeral text hits, then
    /// ephemeral image hits. Lists are concatenated, never re-ranked.
    pub async fn retrieve(
        &self,
        input: QueryInput,
        uploads: &[UploadedFile],
    ) -> Result<RetrievalOutcome> {
        let mut phases = vec![RetrievalPhase::Idle];

        enter(&mut phases, RetrievalPhase::Classifying);
        let query = input.classify()?;

        enter(&mut phases, RetrievalPhase::SearchingPersisted);
        let (base, mut embedded) = self.search_persisted(&query).await?;

        let mut ephemeral_text = Vec::new();
        let mut ephemeral_image = Vec::new();
        if !uploads.is_empty() {
            enter(&mut phases, RetrievalPhase::SearchingEphemeral);
            let indexes = self.ephemeral.collect(uploads).await.into_indexes()?;
            (ephemeral_text, ephemeral_image) =
                self.search_ephemeral(&query, &indexes, &mut embedded).await?;
        }

        enter(&mut phases, RetrievalPhase::Merging);
        let documents: Vec<RetrievedDocument> = tag(base, DocumentOrigin::Persisted)
            .chain(tag(ephemeral_text, DocumentOrigin::EphemeralText))
            .chain(tag(ephemeral_image, DocumentOrigin::EphemeralImage))
            .collect();
        let prompt = compose_prompt(&documents, query.text().unwrap_or_default());

        enter(&mut phases, RetrievalPhase::Done);
        Ok(RetrievalOutcome {
            documents,
            prompt,
            phases,
        })
    }

    async fn search_persisted(
        &self,
        query: &RetrievalQuery,
    ) -> Result<(Vec<SearchHit>, QueryEmbeddings)> {
        let mut embedded = QueryEmbeddings::default();

        // Text takes priority for the base search when both are given
        let hits = match query {
            RetrievalQuery::Text(text) | RetrievalQuery::Both { text, .. } => {
                let vector = self.processor.embed_text(text).await?;
                let hits = self.persisted.text.search(&vector, self.top_k)?;
                embedded.text = Some(vector);
                hits
            }
            RetrievalQuery::Image(image) => {
                let vector = self.processor.embed_image(image).await?;
                let hits = self.persisted.image.search(&vector, self.top_k)?;
                embedded.image = Some(vector);
                hits
            }
        };

        Ok((hits, embedded))
    }

    async fn search_ephemeral(
        &self,
        query: &RetrievalQuery,
        indexes: &EphemeralIndexes,
        embedded: &mut QueryEmbeddings,
    ) -> Result<(Vec<SearchHit>, Vec<SearchHit>)> {
        let text_hits = match (&indexes.text, &embedded.text) {
            (Some(index), Some(vector)) => index.search(vector, self.top_k)?,
            _ => Vec::new(),
        };

        let image_hits = match (&indexes.image, query.image()) {
            (Some(index), Some(image)) => {
                let vector = match embedded.image.take() {
                    Some(vector) => vector,
                    None => self.processor.embed_image(image).await?,
                };
                index.search(&vector, self.top_k)?
            }
            _ => Vec::new(),
        };

        Ok((text_hits, image_hits))
    }
}

#[derive(Default)]
struct QueryEmbeddings {
    text: Option<EmbeddingVector>,
    image: Option<EmbeddingVector>,
}

fn enter(phases: &mut Vec<RetrievalPhase>, phase: RetrievalPhase) {
    debug!(?phase, "retrieval phase");
    phases.push(phase);
}

fn tag(hits: Vec<SearchHit>, origin: DocumentOrigin) -> impl Iterator<Item = RetrievedDocument> {
    hits.into_iter().map(move |hit| RetrievedDocument {
        record: hit.record,
        distance: hit.distance,
        origin,
    })
}

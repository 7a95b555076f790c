//! Retrieval query and result types

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::{DocumentRecord, Error, Result};

/// Raw query as supplied by the caller. At least one field must be set.
#[derive(Debug, Clone, Default)]
pub struct QueryInput {
    pub text: Option<String>,
    pub image: Option<DynamicImage>,
}

impl QueryInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    pub fn image(image: DynamicImage) -> Self {
        Self {
            text: None,
            image: Some(image),
        }
    }

    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.image = Some(image);
        self
    }

    /// Resolve which modalities are present.
    ///
    /// Blank text counts as absent. Fails with `InvalidQuery` when nothing
    /// usable remains.
    pub fn classify(self) -> Result<RetrievalQuery> {
        let text = self.text.filter(|t| !t.trim().is_empty());
        match (text, self.image) {
            (Some(text), Some(image)) => Ok(RetrievalQuery::Both { text, image }),
            (Some(text), None) => Ok(RetrievalQuery::Text(text)),
            (None, Some(image)) => Ok(RetrievalQuery::Image(image)),
            (None, None) => Err(Error::InvalidQuery(
                "a query needs text, an image, or both".to_string(),
            )),
        }
    }
}

/// A classified query
#[derive(Debug, Clone)]
pub enum RetrievalQuery {
    Text(String),
    Image(DynamicImage),
    Both { text: String, image: DynamicImage },
}

impl RetrievalQuery {
    pub fn text(&self) -> Option<&str> {
        match self {
            RetrievalQuery::Text(text) | RetrievalQuery::Both { text, .. } => Some(text),
            RetrievalQuery::Image(_) => None,
        }
    }

    pub fn image(&self) -> Option<&DynamicImage> {
        match self {
            RetrievalQuery::Image(image) | RetrievalQuery::Both { image, .. } => Some(image),
            RetrievalQuery::Text(_) => None,
        }
    }
}

/// Which list a merged result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOrigin {
    Persisted,
    EphemeralText,
    EphemeralImage,
}

/// A document in the merged retrieval list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub record: DocumentRecord,
    pub distance: f32,
    pub origin: DocumentOrigin,
}

/// Phases of a single retrieval cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalPhase {
    Idle,
    Classifying,
    SearchingPersisted,
    SearchingEphemeral,
    Merging,
    Done,
}

/// Result of one retrieval cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    pub documents: Vec<RetrievedDocument>,
    pub prompt: String,
    pub phases: Vec<RetrievalPhase>,
}

impl RetrievalOutcome {
    /// Sources of the merged documents, in merge order
    pub fn sources(&self) -> Vec<&str> {
        self.documents
            .iter()
            .map(|d| d.record.source.as_str())
            .collect()
    }
}

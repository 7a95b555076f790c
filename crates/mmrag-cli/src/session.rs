//! Chat session state and the per-turn flow

use std::io::Write;
use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use mmrag_core::{Error, QueryInput, Result, RetrievalOutcome, TokenStream, UploadedFile};
use mmrag_rag::decode_image;

use crate::app::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// Image attached to the next questions of a session
#[derive(Debug, Clone)]
pub struct SessionImage {
    pub file: UploadedFile,
    pub decoded: DynamicImage,
}

/// Result of one chat turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub answer: String,
    pub retrieval: RetrievalOutcome,
}

/// One user's conversation: history, uploaded documents and query image
#[derive(Debug, Default)]
pub struct ChatSession {
    history: Vec<HistoryEntry>,
    custom_docs: Vec<UploadedFile>,
    image: Option<SessionImage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn uploads(&self) -> &[UploadedFile] {
        &self.custom_docs
    }

    pub fn image(&self) -> Option<&SessionImage> {
        self.image.as_ref()
    }

    /// Keep a document for the ephemeral index of every following turn
    pub fn add_upload(&mut self, file: UploadedFile) {
        debug!(name = %file.name, bytes = file.bytes.len(), "upload added");
        self.custom_docs.push(file);
    }

    /// Read a file from disk and add it as an upload
    pub fn add_upload_path(&mut self, path: &Path) -> Result<()> {
        self.add_upload(read_upload(path)?);
        Ok(())
    }

    pub fn clear_uploads(&mut self) {
        self.custom_docs.clear();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Attach a query image. The bytes must decode as an image.
    pub fn set_image(&mut self, file: UploadedFile) -> Result<()> {
        let decoded = decode_image(&file.bytes)?;
        self.image = Some(SessionImage { file, decoded });
        Ok(())
    }

    pub fn set_image_path(&mut self, path: &Path) -> Result<()> {
        self.set_image(read_upload(path)?)
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// Answer one question.
    ///
    /// Retrieval runs first and rejects an empty query before any index
    /// work. Each answer fragment is passed to `on_fragment` as it arrives.
    /// A query image is handed to the backend through a temporary file that
    /// is removed when the turn ends, whether it succeeded or not.
    pub async fn take_turn(
        &mut self,
        state: &AppState,
        question: &str,
        mut on_fragment: impl FnMut(&str),
    ) -> Result<TurnOutcome> {
        let question = question.trim();
        let input = QueryInput {
            text: (!question.is_empty()).then(|| question.to_string()),
            image: self.image.as_ref().map(|image| image.decoded.clone()),
        };

        let retrieval = state.engine().retrieve(input, &self.custom_docs).await?;
        debug!(sources = ?retrieval.sources(), "retrieved documents");

        let temp_image = match &self.image {
            Some(image) => Some(write_temp_image(&image.file.bytes)?),
            None => None,
        };

        let stream = match &temp_image {
            Some(file) => {
                state
                    .backend()
                    .stream_multimodal(&retrieval.prompt, &[file.path().to_path_buf()])
                    .await?
            }
            None => state.backend().stream_text(&retrieval.prompt).await?,
        };
        let answer = relay(stream, &mut on_fragment).await?;
        drop(temp_image);

        let user_content = match (&self.image, question.is_empty()) {
            (Some(image), true) => format!("[Image: {}]", image.file.name),
            _ => question.to_string(),
        };
        self.history.push(HistoryEntry {
            role: Role::User,
            content: user_content,
        });
        self.history.push(HistoryEntry {
            role: Role::Assistant,
            content: answer.clone(),
        });

        Ok(TurnOutcome { answer, retrieval })
    }
}

/// Append fragments to the answer as they arrive.
///
/// An error after some text has arrived ends the answer early; an error
/// before any text fails the turn.
async fn relay(mut stream: TokenStream, on_fragment: &mut impl FnMut(&str)) -> Result<String> {
    let mut answer = String::new();
    while let Some(fragment) = stream.next_fragment().await {
        match fragment {
            Ok(text) => {
                on_fragment(&text);
                answer.push_str(&text);
            }
            Err(e) if answer.is_empty() => return Err(e),
            Err(e) => {
                warn!(error = %e, "generation stopped early");
                break;
            }
        }
    }
    Ok(answer)
}

fn write_temp_image(bytes: &[u8]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("mmrag-query-")
        .suffix(".jpg")
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Other(format!("{} has no file name", path.display())))?;
    let bytes = std::fs::read(path)?;
    Ok(UploadedFile::new(name, bytes))
}

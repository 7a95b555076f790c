//! Common types used across the multimodal RAG assistant

use serde::{Deserialize, Serialize};

/// Modality of an ingested document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Text,
    Image,
}

impl DocumentKind {
    /// File-name prefix used for this modality's persisted index
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Text => "text",
            DocumentKind::Image => "image",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing one ingested unit
///
/// Every record is paired with exactly one embedding vector inside a
/// vector index. Image records carry no content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl DocumentRecord {
    pub fn text(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Text,
            source: source.into(),
            content: Some(content.into()),
        }
    }

    pub fn image(source: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Image,
            source: source.into(),
            content: None,
        }
    }
}

/// A file handed in with a single request rather than read from the corpus
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// How a file is handled by ingestion, decided by extension alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Pdf,
    Image,
    Unsupported,
}

impl FileClass {
    /// Classify a file name. Matching is case-insensitive.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.ends_with(".pdf") {
            FileClass::Pdf
        } else if lower.ends_with(".png") || lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            FileClass::Image
        } else {
            FileClass::Unsupported
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_class_from_name() {
        assert_eq!(FileClass::from_name("report.pdf"), FileClass::Pdf);
        assert_eq!(FileClass::from_name("REPORT.PDF"), FileClass::Pdf);
        assert_eq!(FileClass::from_name("cat.png"), FileClass::Image);
        assert_eq!(FileClass::from_name("cat.JPG"), FileClass::Image);
        assert_eq!(FileClass::from_name("cat.jpeg"), FileClass::Image);
        assert_eq!(FileClass::from_name("notes.txt"), FileClass::Unsupported);
        assert_eq!(FileClass::from_name("pdf"), FileClass::Unsupported);
    }

    #[test]
    fn test_record_serialization_shape() {
        let text = serde_json::to_value(DocumentRecord::text("a.pdf", "hello")).unwrap();
        assert_eq!(
            text,
            serde_json::json!({"type": "text", "source": "a.pdf", "content": "hello"})
        );

        let image = serde_json::to_value(DocumentRecord::image("cat.png")).unwrap();
        assert_eq!(image, serde_json::json!({"type": "image", "source": "cat.png"}));
    }
}

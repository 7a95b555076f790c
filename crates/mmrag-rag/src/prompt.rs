//! Generation prompt assembly

use mmrag_core::{DocumentKind, RetrievedDocument};

/// Build the grounded prompt: each document's text (or an image placeholder)
/// followed by the question.
pub fn compose_prompt(documents: &[RetrievedDocument], question: &str) -> String {
    let mut prompt = String::from("Use the following documents to answer:\n");

    for doc in documents {
        match doc.record.kind {
            DocumentKind::Text => {
                prompt.push_str(doc.record.content.as_deref().unwrap_or_default());
                prompt.push('\n');
            }
            DocumentKind::Image => {
                prompt.push_str(&format!("[Image: {}]\n", doc.record.source));
            }
        }
    }

    prompt.push_str(&format!("\nQuestion: {}\nAnswer:", question));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmrag_core::{DocumentOrigin, DocumentRecord};

    fn doc(record: DocumentRecord) -> RetrievedDocument {
        RetrievedDocument {
            record,
            distance: 0.0,
            origin: DocumentOrigin::Persisted,
        }
    }

    #[test]
    fn test_text_and_image_documents() {
        let docs = vec![
            doc(DocumentRecord::text("a.pdf", "Cats purr.")),
            doc(DocumentRecord::image("cat.png")),
        ];
        assert_eq!(
            compose_prompt(&docs, "Why do cats purr?"),
            "Use the following documents to answer:\nCats purr.\n[Image: cat.png]\n\nQuestion: Why do cats purr?\nAnswer:"
        );
    }

    #[test]
    fn test_no_documents() {
        assert_eq!(
            compose_prompt(&[], ""),
            "Use the following documents to answer:\n\nQuestion: \nAnswer:"
        );
    }
}

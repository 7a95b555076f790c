//! Content extraction for ingested files

use std::panic::{AssertUnwindSafe, catch_unwind};

use image::DynamicImage;

use mmrag_core::{Error, Result};

/// Pulls plain text out of a PDF document
pub trait PdfExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String>;
}

/// PDF text extraction backed by the `pdf-extract` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractText;

impl PdfExtractor for PdfExtractText {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed inputs instead of returning an error
        match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(Error::Decode(format!("unreadable PDF: {}", e))),
            Err(_) => Err(Error::Decode("unreadable PDF: extractor panicked".to_string())),
        }
    }
}

/// Decode image bytes of any supported format
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::Decode(format!("corrupt image: {}", e)))
}

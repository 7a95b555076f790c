//! Fakes shared by the unit tests of this crate

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use mmrag_core::{EmbeddingVector, Error, ImageEmbedder, Result, TextEmbedder};

use crate::document_indexer::DocumentProcessor;
use crate::embedders::{HashedTextEmbedder, ThumbnailImageEmbedder};
use crate::extract::PdfExtractor;

const STUB_PDF_MAGIC: &[u8] = b"%PDF-stub\n";

/// Bytes the stub extractor accepts, carrying `text` as the PDF body
pub fn stub_pdf(text: &str) -> Vec<u8> {
    let mut bytes = STUB_PDF_MAGIC.to_vec();
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Extracts the body of [`stub_pdf`] output and rejects anything else
pub struct StubPdfExtractor;

impl PdfExtractor for StubPdfExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        match bytes.strip_prefix(STUB_PDF_MAGIC) {
            Some(body) => String::from_utf8(body.to_vec())
                .map_err(|e| Error::Decode(e.to_string())),
            None => Err(Error::Decode("unreadable PDF: missing header".to_string())),
        }
    }
}

/// A real one-page PDF showing `text` in Helvetica, with a correct xref table
pub fn minimal_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 24 Tf 72 720 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_start = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_start
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

/// 8x8 single-colour PNG
pub fn png_bytes(color: [u8; 3]) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb(color)));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode png fixture");
    out.into_inner()
}

pub fn solid_image(color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb(color)))
}

/// Text embedder that counts calls
pub struct CountingTextEmbedder {
    inner: HashedTextEmbedder,
    pub calls: Arc<AtomicUsize>,
}

impl CountingTextEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: HashedTextEmbedder::new(dimension),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl TextEmbedder for CountingTextEmbedder {
    async fn embed_text(&self, text: &str) -> Result<EmbeddingVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_text(text).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_id(&self) -> &str {
        "counting"
    }
}

/// Image embedder that counts calls
pub struct CountingImageEmbedder {
    inner: ThumbnailImageEmbedder,
    pub calls: Arc<AtomicUsize>,
}

impl CountingImageEmbedder {
    pub fn new(side: u32) -> Self {
        Self {
            inner: ThumbnailImageEmbedder::new(side),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ImageEmbedder for CountingImageEmbedder {
    async fn embed_image(&self, image: &DynamicImage) -> Result<EmbeddingVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_image(image).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_id(&self) -> &str {
        "counting"
    }
}

/// Processor with counting embedders, returning the text and image call counters
pub fn counting_processor() -> (DocumentProcessor, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let text = CountingTextEmbedder::new(64);
    let image = CountingImageEmbedder::new(4);
    let text_calls = text.calls.clone();
    let image_calls = image.calls.clone();
    let processor = DocumentProcessor::new(Arc::new(text), Arc::new(image))
        .with_pdf_extractor(Arc::new(StubPdfExtractor));
    (processor, text_calls, image_calls)
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

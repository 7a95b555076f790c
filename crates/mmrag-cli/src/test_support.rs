//! Fakes shared by the unit tests of this crate

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use mmrag_core::{
    ChatRequest, ContentPart, DocumentRecord, Error, GenerationBackend, MessageContent,
    RagConfig, Result, TokenStream,
};
use mmrag_rag::{
    DocumentProcessor, HashedTextEmbedder, IndexPair, PdfExtractor, ThumbnailImageEmbedder,
    VectorIndex,
};

use crate::app::AppState;

const STUB_PDF_MAGIC: &[u8] = b"%PDF-stub\n";

struct StubPdfExtractor;

impl PdfExtractor for StubPdfExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String> {
        bytes
            .strip_prefix(STUB_PDF_MAGIC)
            .map(|body| String::from_utf8_lossy(body).into_owned())
            .ok_or_else(|| Error::Decode("unreadable PDF: missing header".to_string()))
    }
}

pub fn stub_pdf_bytes() -> Vec<u8> {
    let mut bytes = STUB_PDF_MAGIC.to_vec();
    bytes.extend_from_slice(b"my cat sleeps on the keyboard");
    bytes
}

pub fn png_bytes(color: [u8; 3]) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb(color)));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode png fixture");
    out.into_inner()
}

pub fn processor() -> DocumentProcessor {
    DocumentProcessor::new(
        Arc::new(HashedTextEmbedder::new(32)),
        Arc::new(ThumbnailImageEmbedder::new(4)),
    )
    .with_pdf_extractor(Arc::new(StubPdfExtractor))
}

/// Index pair with a single zero vector per modality
pub fn index_pair(text_dimension: usize, image_dimension: usize) -> IndexPair {
    IndexPair {
        text: VectorIndex::from_parts(
            text_dimension,
            vec![vec![0.0; text_dimension]],
            vec![DocumentRecord::text("zero.pdf", "zero")],
        )
        .unwrap(),
        image: VectorIndex::from_parts(
            image_dimension,
            vec![vec![0.0; image_dimension]],
            vec![DocumentRecord::image("zero.png")],
        )
        .unwrap(),
    }
}

/// Index pair embedded with the same providers as [`processor`]
pub async fn index_pair_with_docs() -> IndexPair {
    let processor = processor();
    let mut text = VectorIndex::new(32);
    for (source, content) in [
        ("cats.pdf", "cats purr when they are relaxed"),
        ("dogs.pdf", "dogs bark at strangers"),
        ("birds.pdf", "birds sing at dawn"),
    ] {
        let vector = processor.embed_text(content).await.unwrap();
        text.add(&vector, DocumentRecord::text(source, content)).unwrap();
    }

    let mut image = VectorIndex::new(48);
    let decoded = mmrag_rag::decode_image(&png_bytes([200, 100, 50])).unwrap();
    let vector = processor.embed_image(&decoded).await.unwrap();
    image.add(&vector, DocumentRecord::image("orange.png")).unwrap();

    IndexPair { text, image }
}

pub fn state_with(pair: IndexPair, backend: Arc<dyn GenerationBackend>) -> AppState {
    let config = RagConfig {
        text_dimension: 32,
        image_side: 4,
        ..Default::default()
    };
    AppState::from_parts(config, pair, processor(), backend).unwrap()
}

/// Backend that replays fixed fragments and records what it was asked
pub struct ScriptedBackend {
    fragments: Vec<String>,
    fail: bool,
    trailing_error: bool,
    prompts: Mutex<Vec<String>>,
    image_paths: Mutex<Vec<PathBuf>>,
    images_existed: AtomicBool,
}

impl ScriptedBackend {
    pub fn new(fragments: Vec<&str>) -> Self {
        Self {
            fragments: fragments.into_iter().map(String::from).collect(),
            fail: false,
            trailing_error: false,
            prompts: Mutex::new(Vec::new()),
            image_paths: Mutex::new(Vec::new()),
            images_existed: AtomicBool::new(false),
        }
    }

    /// Every request fails before streaming starts
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }

    /// End the stream with an error after the fragments
    pub fn then_error(mut self) -> Self {
        self.trailing_error = true;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn image_paths(&self) -> Vec<PathBuf> {
        self.image_paths.lock().unwrap().clone()
    }

    pub fn image_existed_during_call(&self) -> bool {
        self.images_existed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn stream_chat(&self, request: ChatRequest) -> Result<TokenStream> {
        if let Some(message) = request.messages.first() {
            let prompt = match &message.content {
                MessageContent::Text(text) => text.clone(),
                MessageContent::Parts(parts) => parts
                    .iter()
                    .find_map(|part| match part {
                        ContentPart::Text { text } => Some(text.clone()),
                        ContentPart::Image { .. } => None,
                    })
                    .unwrap_or_default(),
            };
            self.prompts.lock().unwrap().push(prompt);
        }

        if self.fail {
            return Err(Error::Generation("backend unavailable".to_string()));
        }

        let (tx, rx) = TokenStream::channel();
        for fragment in &self.fragments {
            tx.try_send(Ok(fragment.clone())).unwrap();
        }
        if self.trailing_error {
            tx.try_send(Err(Error::Network("connection reset".to_string())))
                .unwrap();
        }
        Ok(TokenStream::from_receiver(rx))
    }

    async fn stream_multimodal(&self, prompt: &str, image_paths: &[PathBuf]) -> Result<TokenStream> {
        self.images_existed
            .store(image_paths.iter().all(|p| p.exists()), Ordering::SeqCst);
        self.image_paths.lock().unwrap().extend_from_slice(image_paths);
        self.stream_chat(ChatRequest::user_multimodal(self.model_id(), prompt, vec![]))
            .await
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

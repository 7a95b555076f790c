//! Offline corpus ingestion

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use mmrag_core::{DocumentKind, Result};

use crate::document_indexer::{DocumentProcessor, IngestionReport, ProcessedDocument};
use crate::store::remove_persisted;
use crate::vector_index::VectorIndex;

/// Indexes produced by one ingestion pass. A modality with no documents has no index.
#[derive(Debug, Clone)]
pub struct CorpusBuild {
    pub text: Option<VectorIndex>,
    pub image: Option<VectorIndex>,
    pub report: IngestionReport,
}

/// Scans a document directory and builds the persisted index pair
pub struct CorpusBuilder {
    processor: DocumentProcessor,
}

impl CorpusBuilder {
    pub fn new(processor: DocumentProcessor) -> Self {
        Self { processor }
    }

    /// Process every file in `docs_dir` without touching durable storage.
    ///
    /// Only the top level is scanned, in file-name order. A file that fails
    /// is logged and reported, never fatal.
    pub async fn build(&self, docs_dir: &Path) -> Result<CorpusBuild> {
        let files = list_files(docs_dir)?;
        info!(dir = %docs_dir.display(), files = files.len(), "starting ingestion");

        let mut text = VectorIndex::new(self.processor.text_embedder().dimension());
        let mut image = VectorIndex::new(self.processor.image_embedder().dimension());
        let mut report = IngestionReport::default();

        for path in files {
            let name = file_name(&path);

            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(source = %name, error = %e, "could not read file");
                    report.record_failure(mmrag_core::Error::ingestion_item(&name, e));
                    continue;
                }
            };

            match self.processor.process(&name, &bytes).await {
                Ok(ProcessedDocument::Text { vector, record }) => {
                    text.add(&vector, record)?;
                    report.text_indexed += 1;
                }
                Ok(ProcessedDocument::Image { vector, record }) => {
                    image.add(&vector, record)?;
                    report.images_indexed += 1;
                }
                Ok(ProcessedDocument::EmptyText) => {
                    info!(source = %name, "skipping PDF without text");
                    report.skipped.push(name);
                }
                Ok(ProcessedDocument::Unsupported) => {
                    info!(source = %name, "skipping unsupported file type");
                    report.skipped.push(name);
                }
                Err(e) => {
                    warn!(error = %e, "skipping file");
                    report.record_failure(e);
                }
            }
        }

        info!(
            text = report.text_indexed,
            images = report.images_indexed,
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "ingestion pass finished"
        );

        Ok(CorpusBuild {
            text: (!text.is_empty()).then_some(text),
            image: (!image.is_empty()).then_some(image),
            report,
        })
    }

    /// Full rebuild: process `docs_dir` and replace the index pair in `out_dir`.
    ///
    /// A modality with no documents gets no index file, and any file left
    /// from an earlier build is removed.
    pub async fn ingest(&self, docs_dir: &Path, out_dir: &Path) -> Result<IngestionReport> {
        let build = self.build(docs_dir).await?;

        for (kind, index) in [
            (DocumentKind::Text, &build.text),
            (DocumentKind::Image, &build.image),
        ] {
            match index {
                Some(index) => {
                    index.save(out_dir, kind)?;
                    info!(modality = %kind, entries = index.len(), dir = %out_dir.display(), "index written");
                }
                None => {
                    warn!(modality = %kind, "no documents indexed, index not written");
                    remove_persisted(out_dir, kind)?;
                }
            }
        }

        Ok(build.report)
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        // fs::metadata follows symlinks
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => debug!(path = %path.display(), "skipping non-file entry"),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable entry"),
        }
    }
    files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

//! Durable storage for vector indexes
//!
//! Each modality is written as two files in the vectorstore directory:
//! `<modality>_index.bin` holds the flat vector buffer (bincode) and
//! `<modality>_metadata.json` holds the document records in the same order.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use mmrag_core::{DocumentKind, DocumentRecord, Error, Result};

use crate::vector_index::VectorIndex;

const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StoredVectors {
    version: u32,
    dimension: u64,
    count: u64,
    data: Vec<f32>,
}

/// Path of the vector file for a modality
pub fn index_path(dir: &Path, kind: DocumentKind) -> PathBuf {
    dir.join(format!("{}_index.bin", kind))
}

/// Path of the metadata file for a modality
pub fn metadata_path(dir: &Path, kind: DocumentKind) -> PathBuf {
    dir.join(format!("{}_metadata.json", kind))
}

impl VectorIndex {
    /// Persist this index as the given modality, replacing any previous version
    pub fn save(&self, dir: &Path, kind: DocumentKind) -> Result<()> {
        fs::create_dir_all(dir)?;
        self.save_files(&index_path(dir, kind), &metadata_path(dir, kind))
    }

    /// Load the persisted index for a modality
    pub fn load(dir: &Path, kind: DocumentKind) -> Result<Self> {
        Self::load_files(&index_path(dir, kind), &metadata_path(dir, kind))
    }

    /// Write the vector buffer and the records to explicit paths
    pub fn save_files(&self, vectors_path: &Path, metadata_path: &Path) -> Result<()> {
        let stored = StoredVectors {
            version: INDEX_FORMAT_VERSION,
            dimension: self.dimension() as u64,
            count: self.len() as u64,
            data: self.flat_data().to_vec(),
        };
        let vector_bytes = bincode::serde::encode_to_vec(&stored, bincode::config::standard())
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let metadata_bytes = serde_json::to_vec_pretty(self.records())?;

        write_replacing(vectors_path, &vector_bytes)?;
        write_replacing(metadata_path, &metadata_bytes)?;

        debug!(
            path = %vectors_path.display(),
            entries = self.len(),
            dimension = self.dimension(),
            "saved vector index"
        );
        Ok(())
    }

    /// Read an index back from explicit paths
    pub fn load_files(vectors_path: &Path, metadata_path: &Path) -> Result<Self> {
        let vector_bytes = fs::read(vectors_path).map_err(|e| Error::index_load(vectors_path, e))?;
        let (stored, _): (StoredVectors, usize) =
            bincode::serde::decode_from_slice(&vector_bytes, bincode::config::standard())
                .map_err(|e| Error::index_load(vectors_path, e))?;

        if stored.version != INDEX_FORMAT_VERSION {
            return Err(Error::index_load(
                vectors_path,
                format!("unsupported format version {}", stored.version),
            ));
        }

        let metadata_bytes =
            fs::read(metadata_path).map_err(|e| Error::index_load(metadata_path, e))?;
        let records: Vec<DocumentRecord> = serde_json::from_slice(&metadata_bytes)
            .map_err(|e| Error::index_load(metadata_path, e))?;

        if records.len() as u64 != stored.count {
            return Err(Error::index_load(
                metadata_path,
                format!(
                    "{} records but the vector file holds {} entries",
                    records.len(),
                    stored.count
                ),
            ));
        }

        VectorIndex::from_flat(stored.dimension as usize, stored.data, records)
            .map_err(|e| Error::index_load(vectors_path, e))
    }
}

/// Delete a modality's persisted files. Returns whether anything was removed.
pub fn remove_persisted(dir: &Path, kind: DocumentKind) -> Result<bool> {
    let mut removed = false;
    for path in [index_path(dir, kind), metadata_path(dir, kind)] {
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "removed stale index file");
                removed = true;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(removed)
}

fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// The persisted text and image indexes of a corpus
#[derive(Debug, Clone)]
pub struct IndexPair {
    pub text: VectorIndex,
    pub image: VectorIndex,
}

impl IndexPair {
    /// Load both modalities. Either one missing or corrupt is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let text = VectorIndex::load(dir, DocumentKind::Text)?;
        let image = VectorIndex::load(dir, DocumentKind::Image)?;
        info!(
            dir = %dir.display(),
            text_entries = text.len(),
            image_entries = image.len(),
            "loaded persisted index pair"
        );
        Ok(Self { text, image })
    }

    pub fn get(&self, kind: DocumentKind) -> &VectorIndex {
        match kind {
            DocumentKind::Text => &self.text,
            DocumentKind::Image => &self.image,
        }
    }
}

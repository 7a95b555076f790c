//! Exact nearest-neighbour index over fixed-dimension vectors

use mmrag_core::{DocumentRecord, Error, Result, SearchHit, squared_l2};

/// Flat vector storage with a parallel sequence of document records.
///
/// Entry `i` of the vector buffer always belongs to record `i`. Search is a
/// brute-force scan ranked by squared Euclidean distance.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    data: Vec<f32>,
    records: Vec<DocumentRecord>,
}

impl VectorIndex {
    /// Create an empty index fixed to `dimension`
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Build an index from parallel vector and record lists
    pub fn from_parts(
        dimension: usize,
        vectors: Vec<Vec<f32>>,
        records: Vec<DocumentRecord>,
    ) -> Result<Self> {
        if vectors.len() != records.len() {
            return Err(Error::VectorStore(format!(
                "{} vectors but {} records",
                vectors.len(),
                records.len()
            )));
        }

        let mut index = Self::new(dimension);
        index.data.reserve(dimension * vectors.len());
        for (vector, record) in vectors.into_iter().zip(records) {
            index.add(&vector, record)?;
        }
        Ok(index)
    }

    /// Rebuild an index from a flat buffer as stored on disk
    pub(crate) fn from_flat(
        dimension: usize,
        data: Vec<f32>,
        records: Vec<DocumentRecord>,
    ) -> Result<Self> {
        if dimension == 0 || data.len() != dimension * records.len() {
            return Err(Error::VectorStore(format!(
                "buffer of {} floats does not hold {} vectors of dimension {}",
                data.len(),
                records.len(),
                dimension
            )));
        }
        Ok(Self {
            dimension,
            data,
            records,
        })
    }

    /// Append a vector and its record together
    pub fn add(&mut self, vector: &[f32], record: DocumentRecord) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.data.extend_from_slice(vector);
        self.records.push(record);
        Ok(())
    }

    /// Up to `k` nearest entries, nearest first.
    ///
    /// Equal distances keep insertion order. An empty index yields no hits.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors()
            .enumerate()
            .map(|(i, vector)| (i, squared_l2(query, vector)))
            .collect();

        // sort_by is stable, so ties stay in insertion order
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| SearchHit {
                record: self.records[i].clone(),
                distance,
            })
            .collect())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    /// Stored vector at position `i`
    pub fn vector(&self, i: usize) -> Option<&[f32]> {
        if i >= self.len() {
            return None;
        }
        let start = i * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    /// Iterate stored vectors in insertion order
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> + '_ {
        // chunks_exact panics on a zero chunk size; a zero-dimension index holds no data
        self.data.chunks_exact(self.dimension.max(1))
    }

    pub(crate) fn flat_data(&self) -> &[f32] {
        &self.data
    }
}

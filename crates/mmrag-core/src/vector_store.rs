//! Vector search result types

use serde::{Deserialize, Serialize};

use crate::DocumentRecord;

/// Default number of neighbours returned per search
pub const DEFAULT_TOP_K: usize = 3;

/// One entry returned by a nearest-neighbour search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub record: DocumentRecord,
    /// Squared Euclidean distance to the query. Lower is closer.
    pub distance: f32,
}

/// Squared Euclidean distance between two equal-length vectors
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

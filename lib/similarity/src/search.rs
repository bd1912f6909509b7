//! Exact nearest-neighbor search under cosine distance
//!
//! Every catalog row is scored against the query, then ordered by
//! `(distance, catalog index)` so ties always resolve the same way.

use crate::encoder::EmbeddingMatrix;
use crate::{Error, Result};
use fitlife_core::Vector;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;

/// Upper bound of the relevance score
pub const MAX_SCORE: f32 = 5.0;

pub const EMPTY_CATALOG_WARNING: &str = "routine catalog is empty";

/// One neighbor of a query
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborResult {
    pub catalog_index: usize,
    pub distance: f32,
    pub score: f32,
}

/// Ordered neighbors plus an optional degradation notice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub neighbors: Vec<NeighborResult>,
    pub warning: Option<String>,
}

/// `max(0, 1 - distance) * 5`, rounded to one decimal
pub fn distance_to_score(distance: f32) -> f32 {
    let raw = (1.0 - distance).max(0.0) * MAX_SCORE;
    ((raw * 10.0).round() / 10.0).clamp(0.0, MAX_SCORE)
}

/// Clamp a requested neighbor count into `[1, catalog_size]`
pub fn clamp_top_n(requested: i64, catalog_size: usize) -> usize {
    let requested = usize::try_from(requested.max(1)).unwrap_or(usize::MAX);
    requested.min(catalog_size)
}

/// Brute-force cosine search over a fixed embedding matrix
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    matrix: EmbeddingMatrix,
}

impl SearchEngine {
    pub fn new(matrix: EmbeddingMatrix) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &EmbeddingMatrix {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    /// Return the `top_n` nearest rows. An empty catalog is not an error.
    pub fn search(&self, query: &Vector, top_n: i64) -> Result<SearchResults> {
        if self.matrix.is_empty() {
            return Ok(SearchResults {
                neighbors: Vec::new(),
                warning: Some(EMPTY_CATALOG_WARNING.to_string()),
            });
        }

        if query.dim() != self.matrix.dim() {
            return Err(Error::InvalidDimension {
                expected: self.matrix.dim(),
                actual: query.dim(),
            });
        }

        let n = clamp_top_n(top_n, self.matrix.len());

        let mut scored: Vec<(OrderedFloat<f32>, usize)> = self
            .matrix
            .rows()
            .par_iter()
            .enumerate()
            .map(|(index, row)| (OrderedFloat(row.cosine_distance(query)), index))
            .collect();

        // keys are unique because of the index
        scored.sort_unstable();
        scored.truncate(n);

        let neighbors = scored
            .into_iter()
            .map(|(distance, catalog_index)| NeighborResult {
                catalog_index,
                distance: distance.0,
                score: distance_to_score(distance.0),
            })
            .collect();

        Ok(SearchResults {
            neighbors,
            warning: None,
        })
    }
}

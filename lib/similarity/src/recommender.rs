//! Routine recommender
//!
//! Bundles the catalog, its fitted encoder and the search engine built over
//! the catalog's embedding matrix. Immutable once constructed, so one
//! instance can serve concurrent requests.

use crate::catalog::Catalog;
use crate::encoder::{CatalogEncoder, EmbeddingMatrix, EncoderState};
use crate::explain::{RecommendResponse, RoutineMatch};
use crate::search::SearchEngine;
use crate::vectorizer::{PointQuery, QueryVectorizer};
use crate::{Error, Result};

/// Identifier reported in recommendation metadata
pub const DEFAULT_MODEL_ID: &str = "knn-cosine";

#[derive(Debug, Clone)]
pub struct Recommender {
    model_id: String,
    catalog: Catalog,
    encoder: EncoderState,
    engine: SearchEngine,
}

impl Recommender {
    /// Fit a fresh encoder over the catalog
    pub fn fit(model_id: impl Into<String>, catalog: Catalog) -> Self {
        let (encoder, matrix) = CatalogEncoder::fit(&catalog);
        Self {
            model_id: model_id.into(),
            catalog,
            encoder,
            engine: SearchEngine::new(matrix),
        }
    }

    /// Assemble from previously fitted parts
    pub fn from_parts(
        model_id: impl Into<String>,
        catalog: Catalog,
        encoder: EncoderState,
        matrix: EmbeddingMatrix,
    ) -> Result<Self> {
        encoder.validate()?;
        if matrix.len() != catalog.len() {
            return Err(Error::MatrixShape {
                rows: matrix.len(),
                entries: catalog.len(),
            });
        }
        if matrix.dim() != encoder.dim() {
            return Err(Error::InvalidDimension {
                expected: encoder.dim(),
                actual: matrix.dim(),
            });
        }
        Ok(Self {
            model_id: model_id.into(),
            catalog,
            encoder,
            engine: SearchEngine::new(matrix),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn encoder(&self) -> &EncoderState {
        &self.encoder
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Find the `top_n` routines closest to the query
    pub fn recommend(&self, query: &PointQuery, top_n: i64) -> Result<RecommendResponse> {
        let vector = QueryVectorizer::new(&self.encoder).vectorize(query);
        let results = self.engine.search(&vector, top_n)?;

        let items = results
            .neighbors
            .iter()
            .filter_map(|n| {
                self.catalog
                    .get(n.catalog_index)
                    .map(|entry| RoutineMatch::from_neighbor(entry, n))
            })
            .collect();

        Ok(RecommendResponse::new(
            self.model_id.clone(),
            items,
            results.warning,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RoutineEntry;
    use crate::search::EMPTY_CATALOG_WARNING;

    fn entry(name: &str, goal: &str, level: &str, sex: &str, ages: (f64, f64), mins: (f64, f64)) -> RoutineEntry {
        RoutineEntry {
            name: Some(name.into()),
            goal: Some(goal.into()),
            level: Some(level.into()),
            sex: Some(sex.into()),
            min_age: Some(ages.0),
            max_age: Some(ages.1),
            min_minutes: Some(mins.0),
            max_minutes: Some(mins.1),
            focus: Some("fullbody".into()),
        }
    }

    fn recommender() -> Recommender {
        Recommender::fit(
            DEFAULT_MODEL_ID,
            Catalog::new(vec![
                entry("Salud", "salud", "novato", "any", (20.0, 30.0), (20.0, 40.0)),
                entry("Masa", "ganar_musculo", "avanzado", "m", (28.0, 32.0), (50.0, 70.0)),
                entry("HIIT", "hiit", "intermedio", "f", (38.0, 42.0), (10.0, 30.0)),
            ]),
        )
    }

    #[test]
    fn test_point_query_finds_matching_routine() {
        let r = recommender();
        let query = PointQuery {
            sex: "m".into(),
            age: 30,
            experience_level: "avanzado".into(),
            minutes_available: 60,
            goal: "ganar_musculo".into(),
        };
        let response = r.recommend(&query, 1).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].name, "Masa");
        assert_eq!(response.meta.result_count, 1);
        assert_eq!(response.meta.model_id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn test_self_retrieval() {
        let r = recommender();
        for (index, entry) in r.catalog().iter().enumerate() {
            let v = r.encoder().embed_entry(entry);
            let results = r.engine().search(&v, 1).unwrap();
            assert_eq!(results.neighbors[0].catalog_index, index);
            assert_eq!(results.neighbors[0].score, 5.0);
        }
    }

    #[test]
    fn test_scores_are_bounded() {
        let r = recommender();
        let response = r.recommend(&PointQuery::default(), 10).unwrap();
        assert_eq!(response.items.len(), 3);
        assert!(response.items.iter().all(|i| (0.0..=5.0).contains(&i.score)));
        assert!(response.items.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_empty_catalog_returns_warning() {
        let r = Recommender::fit(DEFAULT_MODEL_ID, Catalog::default());
        let response = r.recommend(&PointQuery::default(), 5).unwrap();
        assert!(response.items.is_empty());
        assert_eq!(response.meta.warning.as_deref(), Some(EMPTY_CATALOG_WARNING));
    }

    #[test]
    fn test_from_parts_rejects_mismatched_matrix() {
        let r = recommender();
        let short = EmbeddingMatrix::from_rows(r.encoder().dim(), vec![]).unwrap();
        assert!(matches!(
            Recommender::from_parts("x", r.catalog().clone(), r.encoder().clone(), short),
            Err(Error::MatrixShape { rows: 0, entries: 3 })
        ));
    }
}

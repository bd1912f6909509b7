//! Query vectorizer
//!
//! Catalog rows describe ranges, a query describes a point. The query is
//! widened into a synthetic range row and run through the same fitted
//! transforms as the catalog. The focus block is left at zero: queries carry
//! no focus preference, so matching is driven by the categorical and numeric
//! blocks only.

use crate::catalog::RoutineEntry;
use crate::encoder::EncoderState;
use fitlife_core::Vector;
use serde::{Deserialize, Serialize};

pub const AGE_TOLERANCE: i64 = 2;
pub const MIN_AGE_FLOOR: i64 = 10;
pub const MAX_AGE_CEILING: i64 = 100;
pub const MINUTES_TOLERANCE: i64 = 10;
pub const MIN_MINUTES_FLOOR: i64 = 5;

/// A user's point query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointQuery {
    pub sex: String,
    pub age: i64,
    pub experience_level: String,
    pub minutes_available: i64,
    pub goal: String,
}

impl Default for PointQuery {
    fn default() -> Self {
        Self {
            sex: "any".to_string(),
            age: 25,
            experience_level: "novato".to_string(),
            minutes_available: 30,
            goal: "salud".to_string(),
        }
    }
}

impl PointQuery {
    /// Widen the point into a range row comparable with catalog entries
    pub fn synthetic_range(&self) -> RoutineEntry {
        let age = self.age;
        let minutes = self.minutes_available;
        RoutineEntry {
            name: None,
            goal: Some(self.goal.clone()),
            level: Some(self.experience_level.clone()),
            sex: Some(self.sex.clone()),
            min_age: Some(age.saturating_sub(AGE_TOLERANCE).max(MIN_AGE_FLOOR) as f64),
            max_age: Some(age.saturating_add(AGE_TOLERANCE).min(MAX_AGE_CEILING) as f64),
            min_minutes: Some(minutes.saturating_sub(MINUTES_TOLERANCE).max(MIN_MINUTES_FLOOR) as f64),
            max_minutes: Some(minutes.saturating_add(MINUTES_TOLERANCE) as f64),
            focus: None,
        }
    }
}

/// Projects point queries into a fitted encoder's space
#[derive(Debug, Clone, Copy)]
pub struct QueryVectorizer<'a> {
    state: &'a EncoderState,
}

impl<'a> QueryVectorizer<'a> {
    pub fn new(state: &'a EncoderState) -> Self {
        Self { state }
    }

    pub fn vectorize(&self, query: &PointQuery) -> Vector {
        let row = query.synthetic_range();
        // no focus tags: the focus block stays zero
        self.state.embed_row(&row.categories(), &row.numerics(), &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::encoder::CatalogEncoder;
    use serde_json::json;

    fn catalog() -> Catalog {
        serde_json::from_value(json!([
            {"name": "Salud 30", "goal": "salud", "level": "novato", "sex": "any",
             "minAge": 14, "maxAge": 65, "minMinutes": 20, "maxMinutes": 40, "focus": "fullbody|core"},
            {"name": "Masa 60", "goal": "ganar_musculo", "level": "avanzado", "sex": "m",
             "minAge": 18, "maxAge": 45, "minMinutes": 50, "maxMinutes": 70, "focus": "pecho|espalda"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_synthetic_range_bounds() {
        let q = PointQuery { age: 11, minutes_available: 8, ..PointQuery::default() };
        let row = q.synthetic_range();
        assert_eq!(row.min_age, Some(10.0));
        assert_eq!(row.max_age, Some(13.0));
        assert_eq!(row.min_minutes, Some(5.0));
        assert_eq!(row.max_minutes, Some(18.0));

        let q = PointQuery { age: 99, minutes_available: 45, ..PointQuery::default() };
        let row = q.synthetic_range();
        assert_eq!(row.min_age, Some(97.0));
        assert_eq!(row.max_age, Some(100.0));
        assert_eq!(row.min_minutes, Some(35.0));
        assert_eq!(row.max_minutes, Some(55.0));
    }

    #[test]
    fn test_query_width_matches_catalog() {
        let (state, matrix) = CatalogEncoder::fit(&catalog());
        let v = QueryVectorizer::new(&state).vectorize(&PointQuery::default());
        assert_eq!(v.dim(), matrix.dim());
    }

    #[test]
    fn test_focus_block_is_zero() {
        let (state, _) = CatalogEncoder::fit(&catalog());
        let v = QueryVectorizer::new(&state).vectorize(&PointQuery::default());
        let focus_start = state.one_hot.dim() + state.scaler.dim();
        assert!(v.as_slice()[focus_start..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_categoricals_pass_through_verbatim() {
        let (state, _) = CatalogEncoder::fit(&catalog());
        let query = PointQuery {
            goal: "ganar_musculo".into(),
            experience_level: "avanzado".into(),
            sex: "m".into(),
            ..PointQuery::default()
        };
        let v = QueryVectorizer::new(&state).vectorize(&query);
        let one_hot = &v.as_slice()[..state.one_hot.dim()];
        assert_eq!(one_hot.iter().sum::<f32>(), 3.0);

        // case differs from the catalog, so nothing matches
        let query = PointQuery { goal: "GANAR_MUSCULO".into(), ..query };
        let v = QueryVectorizer::new(&state).vectorize(&query);
        let one_hot = &v.as_slice()[..state.one_hot.dim()];
        assert_eq!(one_hot.iter().sum::<f32>(), 2.0);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let q: PointQuery = serde_json::from_value(json!({"experienceLevel": "avanzado", "minutesAvailable": 50})).unwrap();
        assert_eq!(q.experience_level, "avanzado");
        assert_eq!(q.minutes_available, 50);
        assert_eq!(q.sex, "any");
        assert_eq!(q.age, 25);
        assert_eq!(q.goal, "salud");
    }

    #[test]
    fn test_vectorize_is_deterministic() {
        let (state, _) = CatalogEncoder::fit(&catalog());
        let vectorizer = QueryVectorizer::new(&state);
        let q = PointQuery { age: 33, ..PointQuery::default() };
        assert_eq!(vectorizer.vectorize(&q), vectorizer.vectorize(&q));
    }
}

//! Catalog encoder
//!
//! Fits a fixed-width embedding over the routine catalog. Each row is the
//! concatenation, in this order, of:
//!
//! 1. one-hot blocks for `goal`, `level`, `sex` (unseen categories encode to zeros)
//! 2. standardized `minAge`, `maxAge`, `minMinutes`, `maxMinutes` (missing values median-imputed)
//! 3. bag-of-presence over the sorted focus vocabulary
//!
//! The fitted [`EncoderState`] is immutable and must be shared by the catalog
//! and every query; two separate fits never produce comparable vectors.

use crate::catalog::{Catalog, CategoricalColumn, NumericColumn, RoutineEntry};
use crate::{Error, Result};
use fitlife_core::Vector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoding over the categorical columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Sorted, distinct categories per column
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit(catalog: &Catalog) -> Self {
        let mut seen: [BTreeSet<&str>; 3] = Default::default();
        for entry in catalog.iter() {
            for (set, value) in seen.iter_mut().zip(entry.categories()) {
                set.insert(value);
            }
        }
        Self {
            categories: seen
                .iter()
                .map(|set| set.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    pub fn encode_into(&self, values: &[&str; 3], out: &mut Vec<f32>) {
        for (column, value) in self.categories.iter().zip(values.iter()) {
            let start = out.len();
            out.resize(start + column.len(), 0.0);
            if let Ok(pos) = column.binary_search_by(|c| c.as_str().cmp(value)) {
                out[start + pos] = 1.0;
            }
        }
    }
}

/// Median imputation followed by standardization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericScaler {
    medians: Vec<f64>,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl NumericScaler {
    pub fn fit(catalog: &Catalog) -> Self {
        let columns = NumericColumn::ALL.len();
        let mut medians = Vec::with_capacity(columns);
        let mut means = Vec::with_capacity(columns);
        let mut scales = Vec::with_capacity(columns);

        for column in NumericColumn::ALL {
            let raw: Vec<Option<f64>> = catalog.iter().map(|e| e.numeric(column)).collect();
            let mut present: Vec<f64> = raw.iter().flatten().copied().collect();
            let median = median(&mut present).unwrap_or(0.0);

            let imputed: Vec<f64> = raw.iter().map(|v| v.unwrap_or(median)).collect();
            let (mean, std) = mean_std(&imputed);

            medians.push(median);
            means.push(mean);
            // constant columns keep their scale
            scales.push(if std > 10.0 * f64::EPSILON { std } else { 1.0 });
        }

        Self { medians, means, scales }
    }

    pub fn dim(&self) -> usize {
        self.means.len()
    }

    pub fn medians(&self) -> &[f64] {
        &self.medians
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn transform_into(&self, values: &[Option<f64>; 4], out: &mut Vec<f32>) {
        for (i, value) in values.iter().enumerate().take(self.dim()) {
            let v = value.filter(|v| v.is_finite()).unwrap_or(self.medians[i]);
            out.push(((v - self.means[i]) / self.scales[i]) as f32);
        }
    }
}

/// Sorted, deduplicated focus tokens seen across the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FocusVocabulary {
    tokens: Vec<String>,
}

impl FocusVocabulary {
    pub fn fit(catalog: &Catalog) -> Self {
        let tokens: BTreeSet<String> = catalog.iter().flat_map(RoutineEntry::focus_tags).collect();
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn encode_into(&self, tags: &[String], out: &mut Vec<f32>) {
        out.extend(self.tokens.iter().map(|token| {
            if tags.contains(token) {
                1.0
            } else {
                0.0
            }
        }));
    }
}

/// Fitted encoder, reused verbatim for catalog and queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderState {
    pub one_hot: OneHotEncoder,
    pub scaler: NumericScaler,
    pub focus_vocab: FocusVocabulary,
}

impl EncoderState {
    pub fn fit(catalog: &Catalog) -> Self {
        let state = Self {
            one_hot: OneHotEncoder::fit(catalog),
            scaler: NumericScaler::fit(catalog),
            focus_vocab: FocusVocabulary::fit(catalog),
        };
        tracing::debug!(
            entries = catalog.len(),
            categorical = state.one_hot.dim(),
            numeric = state.scaler.dim(),
            focus = state.focus_vocab.dim(),
            "fitted catalog encoder"
        );
        state
    }

    /// Total embedding width
    pub fn dim(&self) -> usize {
        self.one_hot.dim() + self.scaler.dim() + self.focus_vocab.dim()
    }

    /// Check the structure of a deserialized state before it is used
    pub fn validate(&self) -> Result<()> {
        let columns = CategoricalColumn::ALL.len();
        if self.one_hot.categories.len() != columns {
            return Err(Error::InvalidEncoder(format!(
                "expected {columns} categorical columns, found {}",
                self.one_hot.categories.len()
            )));
        }
        if self
            .one_hot
            .categories
            .iter()
            .any(|c| c.windows(2).any(|w| w[0] >= w[1]))
        {
            return Err(Error::InvalidEncoder(
                "categories must be sorted and distinct".to_string(),
            ));
        }
        let numeric = NumericColumn::ALL.len();
        let s = &self.scaler;
        if s.medians.len() != numeric || s.means.len() != numeric || s.scales.len() != numeric {
            return Err(Error::InvalidEncoder(format!(
                "expected {numeric} numeric columns"
            )));
        }
        if s.scales.iter().any(|v| *v == 0.0 || !v.is_finite()) {
            return Err(Error::InvalidEncoder("scales must be finite and non-zero".to_string()));
        }
        Ok(())
    }

    /// Encode one row from its parts
    pub fn embed_row(
        &self,
        categories: &[&str; 3],
        numerics: &[Option<f64>; 4],
        focus_tags: &[String],
    ) -> Vector {
        let mut components = Vec::with_capacity(self.dim());
        self.one_hot.encode_into(categories, &mut components);
        self.scaler.transform_into(numerics, &mut components);
        self.focus_vocab.encode_into(focus_tags, &mut components);
        Vector::new(components)
    }

    pub fn embed_entry(&self, entry: &RoutineEntry) -> Vector {
        self.embed_row(&entry.categories(), &entry.numerics(), &entry.focus_tags())
    }

    pub fn embed_catalog(&self, catalog: &Catalog) -> EmbeddingMatrix {
        let rows = catalog
            .entries()
            .par_iter()
            .map(|entry| self.embed_entry(entry))
            .collect();
        EmbeddingMatrix {
            dim: self.dim(),
            rows,
        }
    }
}

/// N catalog rows by D columns, in catalog order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatrix {
    dim: usize,
    rows: Vec<Vector>,
}

impl EmbeddingMatrix {
    /// Build from raw rows; every row must be `dim` wide
    pub fn from_rows(dim: usize, rows: Vec<Vec<f32>>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != dim) {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual: bad.len(),
            });
        }
        Ok(Self {
            dim,
            rows: rows.into_iter().map(Vector::new).collect(),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Vector> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Vector] {
        &self.rows
    }

    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.rows.iter().map(|r| r.as_slice().to_vec()).collect()
    }
}

/// Fits the encoder and embeds the catalog in one pass
pub struct CatalogEncoder;

impl CatalogEncoder {
    pub fn fit(catalog: &Catalog) -> (EncoderState, EmbeddingMatrix) {
        let state = EncoderState::fit(catalog);
        let matrix = state.embed_catalog(catalog);
        (state, matrix)
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Mean and population standard deviation
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(goal: &str, level: &str, sex: &str, ages: (f64, f64), mins: (f64, f64), focus: &str) -> RoutineEntry {
        RoutineEntry {
            name: Some(format!("{goal}-{level}")),
            goal: Some(goal.into()),
            level: Some(level.into()),
            sex: Some(sex.into()),
            min_age: Some(ages.0),
            max_age: Some(ages.1),
            min_minutes: Some(mins.0),
            max_minutes: Some(mins.1),
            focus: Some(focus.into()),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            entry("salud", "novato", "any", (14.0, 65.0), (20.0, 30.0), "fullbody|core"),
            entry("ganar_musculo", "avanzado", "m", (18.0, 45.0), (45.0, 75.0), "pecho|espalda"),
            entry("hiit", "intermedio", "f", (18.0, 50.0), (15.0, 25.0), "cardio | core"),
        ])
    }

    #[test]
    fn test_dimension_layout() {
        let state = EncoderState::fit(&catalog());
        assert_eq!(state.one_hot.dim(), 3 + 3 + 3);
        assert_eq!(state.scaler.dim(), 4);
        assert_eq!(state.focus_vocab.tokens(), ["cardio", "core", "espalda", "fullbody", "pecho"]);
        assert_eq!(state.dim(), 9 + 4 + 5);
    }

    #[test]
    fn test_one_hot_unknown_category_is_zero() {
        let state = EncoderState::fit(&catalog());
        let mut out = Vec::new();
        state.one_hot.encode_into(&["yoga", "novato", "x"], &mut out);
        assert_eq!(out.len(), 9);
        assert_eq!(out.iter().sum::<f32>(), 1.0);
        // "novato" is the 3rd sorted level (avanzado, intermedio, novato)
        assert_eq!(out[3 + 2], 1.0);
    }

    #[test]
    fn test_scaler_standardizes() {
        let state = EncoderState::fit(&catalog());
        let matrix = state.embed_catalog(&catalog());
        // numeric block of each column has zero mean across the catalog
        for col in 9..13 {
            let mean: f32 = matrix.rows().iter().map(|r| r.as_slice()[col]).sum::<f32>() / 3.0;
            assert!(mean.abs() < 1e-5);
        }
    }

    #[test]
    fn test_median_imputation() {
        let mut entries = catalog().entries().to_vec();
        entries[0].min_age = None;
        let scaler = NumericScaler::fit(&Catalog::new(entries));
        // min ages present: 18, 18 -> median 18
        assert_eq!(scaler.medians()[0], 18.0);
        assert_eq!(scaler.scales()[0], 1.0);
    }

    #[test]
    fn test_constant_column_does_not_divide_by_zero() {
        let catalog = Catalog::new(vec![
            entry("a", "b", "c", (20.0, 30.0), (10.0, 20.0), ""),
            entry("a", "b", "c", (20.0, 30.0), (10.0, 20.0), ""),
        ]);
        let (state, matrix) = CatalogEncoder::fit(&catalog);
        assert!(state.scaler.scales().iter().all(|s| *s == 1.0));
        assert!(matrix.rows().iter().all(|r| r.as_slice().iter().all(|v| v.is_finite())));
    }

    #[test]
    fn test_empty_catalog_fits() {
        let (state, matrix) = CatalogEncoder::fit(&Catalog::default());
        assert_eq!(state.dim(), 4);
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (s1, m1) = CatalogEncoder::fit(&catalog());
        let (s2, m2) = CatalogEncoder::fit(&catalog());
        assert_eq!(s1, s2);
        assert_eq!(m1, m2);
    }

    #[test]
    fn test_matrix_from_rows_checks_width() {
        assert!(EmbeddingMatrix::from_rows(2, vec![vec![0.0, 1.0]]).is_ok());
        assert!(matches!(
            EmbeddingMatrix::from_rows(2, vec![vec![0.0]]),
            Err(Error::InvalidDimension { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_validate_rejects_malformed_state() {
        let state = EncoderState::fit(&catalog());
        assert!(state.validate().is_ok());

        let mut broken = state.clone();
        broken.scaler.scales.pop();
        assert!(matches!(broken.validate(), Err(Error::InvalidEncoder(_))));

        let mut unsorted = state;
        unsorted.one_hot.categories[0].reverse();
        assert!(matches!(unsorted.validate(), Err(Error::InvalidEncoder(_))));
    }

    #[test]
    fn test_encoder_state_survives_serialization() {
        let state = EncoderState::fit(&catalog());
        let json = serde_json::to_string(&state).unwrap();
        let restored: EncoderState = serde_json::from_str(&json).unwrap();
        let cat = catalog();
        let e = &cat.entries()[1];
        let (a, b) = (state.embed_entry(e), restored.embed_entry(e));
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert!((x - y).abs() < 1e-6);
        }
    }
}

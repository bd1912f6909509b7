//! Plan synthesis
//!
//! Combines the three model predictions with the static focus and scheme
//! tables into a [`PlanPrediction`]. Everything here is deterministic given
//! the model outputs.

use crate::features::CanonicalFeatures;
use crate::model::{LabelPredictor, ValuePredictor};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const HIIT_SCHEME: &str = "hiit";
pub const DEFAULT_REPS: &str = "10-12";
pub const DEFAULT_REST: &str = "60s";
pub const FALLBACK_FOCUS_TAG: &str = "fullbody";

/// focus id -> ordered blocks, each a set of muscle-group tags
pub type FocusTable = BTreeMap<String, Vec<Vec<String>>>;

/// scheme id -> descriptor
pub type SchemeTable = BTreeMap<String, SchemeDescriptor>;

/// Training-scheme descriptor as stored in the plan artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(default, rename = "descanso", skip_serializing_if = "Option::is_none")]
    pub rest: Option<String>,
    #[serde(default, rename = "nota", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Static lookup tables shipped alongside the models
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanTables {
    #[serde(default)]
    pub grupos: FocusTable,
    #[serde(default)]
    pub schemes: SchemeTable,
}

impl PlanTables {
    /// Block structure for a focus id, `[["fullbody"]]` when unknown
    pub fn focus_plan(&self, focus_id: &str) -> Vec<Vec<String>> {
        self.grupos
            .get(focus_id)
            .cloned()
            .unwrap_or_else(|| vec![vec![FALLBACK_FOCUS_TAG.to_string()]])
    }

    /// Descriptor for a scheme id, empty when unknown
    pub fn scheme(&self, scheme_id: &str) -> SchemeDescriptor {
        self.schemes.get(scheme_id).cloned().unwrap_or_default()
    }
}

/// The three injected predictive capabilities
pub struct PlanModels {
    pub focus: Box<dyn LabelPredictor>,
    pub scheme: Box<dyn LabelPredictor>,
    pub series: Box<dyn ValuePredictor>,
}

impl std::fmt::Debug for PlanModels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanModels").finish_non_exhaustive()
    }
}

/// One training block of the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanBlock {
    pub block_number: usize,
    pub focus_tags: Vec<String>,
    pub series_count: i64,
    pub scheme_hint: String,
}

/// Synthesized plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPrediction {
    pub focus_id: String,
    pub scheme_id: String,
    pub series_count: i64,
    pub reps_descriptor: String,
    pub rest_descriptor: String,
    pub note: String,
    pub focus_plan: Vec<Vec<String>>,
    pub scheme_meta: SchemeDescriptor,
    pub blocks: Vec<PlanBlock>,
}

/// Interval length for HIIT work by `tiempo` bucket
pub fn hiit_interval(tiempo: i64) -> &'static str {
    match tiempo {
        1 => "30s",
        2 => "40s",
        _ => "45s",
    }
}

/// Round half away from zero, saturating into `i64`
pub fn round_series(prediction: f64) -> i64 {
    if prediction.is_nan() {
        return 0;
    }
    // float-to-int `as` casts saturate
    prediction.round() as i64
}

/// Turns model outputs into a structured plan
#[derive(Debug)]
pub struct PlanSynthesizer {
    models: PlanModels,
    tables: PlanTables,
}

impl PlanSynthesizer {
    pub fn new(models: PlanModels, tables: PlanTables) -> Self {
        Self { models, tables }
    }

    pub fn tables(&self) -> &PlanTables {
        &self.tables
    }

    /// Run the three models and assemble the plan. Model failures propagate.
    pub fn synthesize(&self, features: &CanonicalFeatures) -> Result<PlanPrediction> {
        let focus_id = self.models.focus.predict_label(features)?;
        let scheme_id = self.models.scheme.predict_label(features)?;
        let series_count = round_series(self.models.series.predict_value(features)?);

        let focus_plan = self.tables.focus_plan(&focus_id);
        let scheme_meta = self.tables.scheme(&scheme_id);

        let reps_descriptor = if scheme_id == HIIT_SCHEME {
            format!("AMRAP {}", hiit_interval(features.tiempo))
        } else {
            scheme_meta.reps.clone().unwrap_or_else(|| DEFAULT_REPS.to_string())
        };

        let blocks = focus_plan
            .iter()
            .enumerate()
            .map(|(i, tags)| PlanBlock {
                block_number: i + 1,
                focus_tags: tags.clone(),
                series_count,
                scheme_hint: scheme_id.clone(),
            })
            .collect();

        Ok(PlanPrediction {
            rest_descriptor: scheme_meta.rest.clone().unwrap_or_else(|| DEFAULT_REST.to_string()),
            note: scheme_meta.note.clone().unwrap_or_default(),
            focus_id,
            scheme_id,
            series_count,
            reps_descriptor,
            focus_plan,
            scheme_meta,
            blocks,
        })
    }
}

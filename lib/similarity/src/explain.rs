//! Response structures for routine recommendations

use crate::catalog::RoutineEntry;
use crate::search::NeighborResult;
use serde::Serialize;

pub const DEFAULT_MIN_AGE: i64 = 14;
pub const DEFAULT_MAX_AGE: i64 = 65;
pub const DEFAULT_MIN_MINUTES: i64 = 20;
pub const DEFAULT_MAX_MINUTES: i64 = 45;

/// A recommended routine with its relevance score
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineMatch {
    pub name: String,
    pub goal: Option<String>,
    pub level: Option<String>,
    pub sex: Option<String>,
    pub min_age: i64,
    pub max_age: i64,
    pub min_minutes: i64,
    pub max_minutes: i64,
    pub focus_tags: Vec<String>,
    pub score: f32,
}

impl RoutineMatch {
    pub fn from_neighbor(entry: &RoutineEntry, neighbor: &NeighborResult) -> Self {
        let int_or = |v: Option<f64>, default: i64| {
            v.filter(|v| v.is_finite()).map_or(default, |v| v.trunc() as i64)
        };
        Self {
            name: entry
                .name
                .clone()
                .unwrap_or_else(|| format!("Routine-{}", neighbor.catalog_index)),
            goal: entry.goal.clone(),
            level: entry.level.clone(),
            sex: entry.sex.clone(),
            min_age: int_or(entry.min_age, DEFAULT_MIN_AGE),
            max_age: int_or(entry.max_age, DEFAULT_MAX_AGE),
            min_minutes: int_or(entry.min_minutes, DEFAULT_MIN_MINUTES),
            max_minutes: int_or(entry.max_minutes, DEFAULT_MAX_MINUTES),
            focus_tags: entry.focus_tags(),
            score: neighbor.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendMeta {
    pub model_id: String,
    pub result_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Body of a recommendation response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendResponse {
    pub items: Vec<RoutineMatch>,
    pub meta: RecommendMeta,
}

impl RecommendResponse {
    pub fn new(model_id: impl Into<String>, items: Vec<RoutineMatch>, warning: Option<String>) -> Self {
        Self {
            meta: RecommendMeta {
                model_id: model_id.into(),
                result_count: items.len(),
                warning,
            },
            items,
        }
    }

    /// Empty, successful response explaining why nothing was returned
    pub fn degraded(model_id: impl Into<String>, warning: impl Into<String>) -> Self {
        Self::new(model_id, Vec::new(), Some(warning.into()))
    }
}

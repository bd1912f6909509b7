//! Routine catalog definitions
//!
//! Each catalog entry describes a routine by three categorical attributes,
//! four numeric range bounds and a `|`-delimited list of focus tokens.
//! Column order here is part of the embedding layout.

use serde::{Deserialize, Serialize};

/// Delimiter between focus tokens in an entry's `focus` string
pub const FOCUS_DELIMITER: char = '|';

/// Category used when an entry has no value for a categorical column
pub const MISSING_CATEGORY: &str = "any";

/// Categorical columns, in embedding order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalColumn {
    Goal,
    Level,
    Sex,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 3] = [
        CategoricalColumn::Goal,
        CategoricalColumn::Level,
        CategoricalColumn::Sex,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CategoricalColumn::Goal => "goal",
            CategoricalColumn::Level => "level",
            CategoricalColumn::Sex => "sex",
        }
    }
}

/// Numeric columns, in embedding order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    MinAge,
    MaxAge,
    MinMinutes,
    MaxMinutes,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 4] = [
        NumericColumn::MinAge,
        NumericColumn::MaxAge,
        NumericColumn::MinMinutes,
        NumericColumn::MaxMinutes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NumericColumn::MinAge => "minAge",
            NumericColumn::MaxAge => "maxAge",
            NumericColumn::MinMinutes => "minMinutes",
            NumericColumn::MaxMinutes => "maxMinutes",
        }
    }
}

/// One routine in the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

impl RoutineEntry {
    /// Categorical value, [`MISSING_CATEGORY`] when absent
    pub fn category(&self, column: CategoricalColumn) -> &str {
        let value = match column {
            CategoricalColumn::Goal => &self.goal,
            CategoricalColumn::Level => &self.level,
            CategoricalColumn::Sex => &self.sex,
        };
        value.as_deref().unwrap_or(MISSING_CATEGORY)
    }

    /// Numeric value; non-finite values count as missing
    pub fn numeric(&self, column: NumericColumn) -> Option<f64> {
        let value = match column {
            NumericColumn::MinAge => self.min_age,
            NumericColumn::MaxAge => self.max_age,
            NumericColumn::MinMinutes => self.min_minutes,
            NumericColumn::MaxMinutes => self.max_minutes,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn categories(&self) -> [&str; 3] {
        CategoricalColumn::ALL.map(|c| self.category(c))
    }

    pub fn numerics(&self) -> [Option<f64>; 4] {
        NumericColumn::ALL.map(|c| self.numeric(c))
    }

    pub fn focus_tags(&self) -> Vec<String> {
        self.focus.as_deref().map(split_focus).unwrap_or_default()
    }
}

/// Split a focus string into trimmed, non-empty tokens
pub fn split_focus(focus: &str) -> Vec<String> {
    focus
        .split(FOCUS_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// The static set of routines, in load order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<RoutineEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<RoutineEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RoutineEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[RoutineEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoutineEntry> {
        self.entries.iter()
    }
}

impl From<Vec<RoutineEntry>> for Catalog {
    fn from(entries: Vec<RoutineEntry>) -> Self {
        Self::new(entries)
    }
}

//! # FitLife Core
//!
//! Core library for the FitLife recommendation service.
//!
//! This crate provides the request-side building blocks:
//!
//! - [`Vector`] - Dense embedding row with cosine distance
//! - [`FeatureMapper`] - Reconciles both request dialects into [`CanonicalFeatures`]
//! - [`TreeModel`] - Serializable forest implementing the model capabilities
//! - [`PlanSynthesizer`] - Turns model outputs and static tables into a [`PlanPrediction`]
//!
//! ## Example
//!
//! ```rust
//! use fitlife_core::{CanonicalFeatures, RawQuery};
//! use serde_json::json;
//!
//! let raw: RawQuery = serde_json::from_value(json!({
//!     "goal": "ganar_musculo",
//!     "experienceLevel": "avanzado",
//!     "minutesAvailable": 25
//! })).unwrap();
//!
//! let features = CanonicalFeatures::from_raw(raw);
//! assert_eq!(features.as_array(), [2, 3, 4, 2, 3]);
//! ```

pub mod error;
pub mod features;
pub mod model;
pub mod plan;
pub mod vector;

pub use error::{Error, Result};
pub use features::{
    CanonicalFeatures, Coerced, FeatureMapper, FieldSource, RawQuery, RequestShape, Resolution,
};
pub use model::{LabelPredictor, LeafValue, TreeModel, TreeNode, ValuePredictor};
pub use plan::{
    PlanBlock, PlanModels, PlanPrediction, PlanSynthesizer, PlanTables, SchemeDescriptor,
};
pub use vector::Vector;

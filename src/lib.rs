//! # FitLife
//!
//! Workout plan prediction and content-based routine recommendation.
//!
//! FitLife turns a loosely specified user request into a structured training
//! plan, and matches a user profile against a routine catalog by cosine
//! similarity over fitted embeddings.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! fitlife build-recommender --catalog data/routines.json --out fitlife_knn_model.json
//! fitlife serve --plan-artifact data/plan_artifact.json --http-port 8000
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use fitlife::prelude::*;
//! use serde_json::json;
//!
//! let catalog: Catalog = serde_json::from_value(json!([
//!     {"name": "Salud 30", "goal": "salud", "level": "novato", "sex": "any",
//!      "minAge": 14, "maxAge": 65, "minMinutes": 20, "maxMinutes": 40, "focus": "fullbody"}
//! ])).unwrap();
//!
//! let recommender = Recommender::fit(DEFAULT_MODEL_ID, catalog);
//! let response = recommender.recommend(&PointQuery::default(), 5).unwrap();
//! assert_eq!(response.meta.result_count, 1);
//! ```
//!
//! ## Crate Structure
//!
//! - `fitlife-core` - Canonical features, model capabilities, plan synthesis
//! - `fitlife-similarity` - Catalog encoding, query vectorization, cosine search
//! - `fitlife-storage` - Artifact files and the lazily loaded recommender
//! - `fitlife-api` - REST API

// Re-export core types
pub use fitlife_core::{
    CanonicalFeatures, FeatureMapper, LabelPredictor, PlanPrediction, PlanSynthesizer, PlanTables,
    RawQuery, RequestShape, TreeModel, ValuePredictor, Vector,
};

// Re-export similarity
pub use fitlife_similarity::{
    Catalog, CatalogEncoder, EmbeddingMatrix, EncoderState, PointQuery, QueryVectorizer,
    RecommendResponse, Recommender, RoutineEntry, SearchEngine, DEFAULT_MODEL_ID,
};

// Re-export storage
pub use fitlife_storage::{PlanArtifact, PlanService, RecommendArtifact, RecommenderService};

// Re-export API
pub use fitlife_api::{AppState, RestApi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CanonicalFeatures, Catalog, CatalogEncoder, FeatureMapper, PlanService, PointQuery,
        QueryVectorizer, RawQuery, RecommendArtifact, Recommender, RecommenderService,
        RequestShape, SearchEngine, Vector, DEFAULT_MODEL_ID,
    };
}

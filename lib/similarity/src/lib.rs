//! # FitLife Similarity
//!
//! Content-based routine matching over a fixed catalog.
//!
//! ## Features
//!
//! - **Catalog Encoding**: One-hot categoricals, standardized numerics and a focus bag-of-presence
//! - **Query Vectorization**: Point queries widened into range rows in the same space
//! - **Exact Search**: Brute-force cosine neighbors with deterministic tie-breaking
//! - **Scoring**: Distances mapped onto a 0-5 relevance scale
//!
//! ## Example
//!
//! ```rust
//! use fitlife_similarity::{Catalog, PointQuery, Recommender, DEFAULT_MODEL_ID};
//! use serde_json::json;
//!
//! let catalog: Catalog = serde_json::from_value(json!([
//!     {"name": "Salud 30", "goal": "salud", "level": "novato", "sex": "any",
//!      "minAge": 14, "maxAge": 65, "minMinutes": 20, "maxMinutes": 40, "focus": "fullbody"},
//!     {"name": "Masa 60", "goal": "ganar_musculo", "level": "avanzado", "sex": "m",
//!      "minAge": 18, "maxAge": 45, "minMinutes": 50, "maxMinutes": 70, "focus": "pecho|espalda"}
//! ])).unwrap();
//!
//! let recommender = Recommender::fit(DEFAULT_MODEL_ID, catalog);
//! let response = recommender.recommend(&PointQuery::default(), 1).unwrap();
//! assert_eq!(response.items[0].name, "Salud 30");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Catalog    │────>│  Encoder    │────>│  Embedding  │
//! │  (routines) │     │  (fitted)   │     │  Matrix     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │ Vectorizer  │────>│   Search    │
//!                     │  (query)    │     │  (cosine)   │
//!                     └─────────────┘     └─────────────┘
//!                                                │
//!                                         ┌─────────────┐
//!                                         │  Explain    │
//!                                         │  (items)    │
//!                                         └─────────────┘
//! ```

pub mod catalog;
pub mod encoder;
pub mod error;
pub mod explain;
pub mod recommender;
pub mod search;
pub mod vectorizer;

pub use catalog::{Catalog, CategoricalColumn, NumericColumn, RoutineEntry};
pub use encoder::{
    CatalogEncoder, EmbeddingMatrix, EncoderState, FocusVocabulary, NumericScaler, OneHotEncoder,
};
pub use error::{Error, Result};
pub use explain::{RecommendMeta, RecommendResponse, RoutineMatch};
pub use recommender::{Recommender, DEFAULT_MODEL_ID};
pub use search::{distance_to_score, NeighborResult, SearchEngine, SearchResults};
pub use vectorizer::{PointQuery, QueryVectorizer};

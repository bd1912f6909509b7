pub mod rest;

pub use rest::{configure, AppState, PredictResponse, RecommendRequest, RestApi, DEFAULT_TOP_N};

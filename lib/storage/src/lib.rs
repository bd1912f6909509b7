pub mod artifact;
pub mod cache;
pub mod error;
pub mod plan_bundle;
pub mod recommend_bundle;

pub use artifact::{read_artifact, write_artifact, ArtifactFormat, ArtifactInfo};
pub use cache::{LoadState, RecommenderService};
pub use error::{Error, Result};
pub use plan_bundle::{PlanArtifact, PlanService, UNKNOWN_VERSION};
pub use recommend_bundle::RecommendArtifact;

//! Lazily loaded recommender, shared by every request handler

use crate::artifact::ArtifactInfo;
use crate::recommend_bundle::RecommendArtifact;
use fitlife_similarity::Recommender;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Outcome of the single load attempt
#[derive(Debug, Clone)]
pub enum LoadState {
    Ready {
        recommender: Arc<Recommender>,
        info: Option<ArtifactInfo>,
    },
    Unavailable(String),
}

/// Owns the optional recommend artifact.
///
/// The first caller of [`RecommenderService::get`] loads the artifact;
/// concurrent first callers wait on that one load. The outcome, including a
/// failure, is kept for the life of the process.
#[derive(Debug)]
pub struct RecommenderService {
    path: PathBuf,
    cell: OnceLock<LoadState>,
}

impl RecommenderService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }

    /// Already loaded, e.g. built in memory for tests
    pub fn preloaded(recommender: Recommender) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(LoadState::Ready {
            recommender: Arc::new(recommender),
            info: None,
        });
        Self {
            path: PathBuf::new(),
            cell,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the artifact file exists on disk
    pub fn is_present(&self) -> bool {
        match self.cell.get() {
            Some(LoadState::Ready { .. }) => true,
            _ => self.path.is_file(),
        }
    }

    /// Whether a load has completed successfully
    pub fn is_loaded(&self) -> bool {
        matches!(self.cell.get(), Some(LoadState::Ready { .. }))
    }

    pub fn info(&self) -> Option<&ArtifactInfo> {
        match self.cell.get() {
            Some(LoadState::Ready { info, .. }) => info.as_ref(),
            _ => None,
        }
    }

    pub fn state(&self) -> &LoadState {
        self.cell.get_or_init(|| self.load())
    }

    /// The loaded recommender, or the reason it is unavailable
    pub fn get(&self) -> Result<Arc<Recommender>, String> {
        match self.state() {
            LoadState::Ready { recommender, .. } => Ok(Arc::clone(recommender)),
            LoadState::Unavailable(reason) => Err(reason.clone()),
        }
    }

    fn load(&self) -> LoadState {
        let loaded = RecommendArtifact::load(&self.path)
            .and_then(|(artifact, info)| Ok((artifact.into_recommender()?, info)));

        match loaded {
            Ok((recommender, info)) => {
                tracing::info!(
                    path = %self.path.display(),
                    entries = recommender.catalog().len(),
                    dim = recommender.encoder().dim(),
                    "recommender loaded"
                );
                LoadState::Ready {
                    recommender: Arc::new(recommender),
                    info: Some(info),
                }
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "recommender unavailable");
                LoadState::Unavailable(format!("recommender unavailable: {e}"))
            }
        }
    }
}

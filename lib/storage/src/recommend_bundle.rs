//! Recommend artifact: the routine catalog with its fitted encoder and
//! precomputed embeddings. Both derived parts are optional on disk and are
//! rebuilt at load when absent.

use crate::artifact::{read_artifact, write_artifact, ArtifactInfo};
use crate::Result;
use fitlife_similarity::{
    Catalog, CatalogEncoder, EmbeddingMatrix, EncoderState, Recommender, DEFAULT_MODEL_ID,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendArtifact {
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoder: Option<EncoderState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<Vec<Vec<f32>>>,
}

impl RecommendArtifact {
    /// Fit the encoder and embed the catalog
    pub fn build(catalog: Catalog) -> Self {
        let (encoder, matrix) = CatalogEncoder::fit(&catalog);
        Self {
            model_id: default_model_id(),
            embeddings: Some(matrix.to_rows()),
            encoder: Some(encoder),
            catalog,
        }
    }

    /// Fit from a JSON catalog file and write the artifact
    pub fn build_from_file(catalog_path: &Path, out: &Path) -> Result<ArtifactInfo> {
        let (catalog, _): (Catalog, _) = read_artifact(catalog_path)?;
        let artifact = Self::build(catalog);
        tracing::info!(
            entries = artifact.catalog.len(),
            dim = artifact.encoder.as_ref().map_or(0, EncoderState::dim),
            "built recommender"
        );
        write_artifact(out, &artifact)
    }

    pub fn load(path: &Path) -> Result<(Self, ArtifactInfo)> {
        read_artifact(path)
    }

    /// Assemble a recommender, filling in whatever the file left out
    pub fn into_recommender(self) -> Result<Recommender> {
        let catalog = self.catalog;

        let encoder = match self.encoder {
            Some(encoder) => {
                encoder.validate()?;
                encoder
            }
            None => {
                tracing::info!(entries = catalog.len(), "artifact has no encoder, fitting one");
                EncoderState::fit(&catalog)
            }
        };

        let matrix = match self.embeddings {
            Some(rows) => match EmbeddingMatrix::from_rows(encoder.dim(), rows) {
                Ok(matrix) if matrix.len() == catalog.len() => matrix,
                Ok(matrix) => {
                    tracing::warn!(
                        rows = matrix.len(),
                        entries = catalog.len(),
                        "embedding rows disagree with catalog, rebuilding"
                    );
                    encoder.embed_catalog(&catalog)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored embeddings unusable, rebuilding");
                    encoder.embed_catalog(&catalog)
                }
            },
            None => encoder.embed_catalog(&catalog),
        };

        Ok(Recommender::from_parts(self.model_id, catalog, encoder, matrix)?)
    }

    pub fn save(&self, path: &Path) -> Result<ArtifactInfo> {
        write_artifact(path, self)
    }
}

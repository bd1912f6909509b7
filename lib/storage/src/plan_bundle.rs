//! Plan artifact: the three plan models, the static tables and a version tag.
//!
//! This artifact is mandatory. A missing file or a missing model is reported
//! as an error so the caller can refuse to start.

use crate::artifact::{read_artifact, write_artifact, ArtifactInfo};
use crate::{Error, Result};
use fitlife_core::plan::{FocusTable, SchemeTable};
use fitlife_core::{
    CanonicalFeatures, PlanModels, PlanPrediction, PlanSynthesizer, PlanTables, TreeModel,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const UNKNOWN_VERSION: &str = "NA";

fn default_version() -> String {
    UNKNOWN_VERSION.to_string()
}

/// Serialized form of the plan artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanArtifact {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub focus_clf: Option<TreeModel>,
    #[serde(default)]
    pub scheme_clf: Option<TreeModel>,
    #[serde(default)]
    pub series_reg: Option<TreeModel>,
    #[serde(default)]
    pub grupos: FocusTable,
    #[serde(default)]
    pub schemes: SchemeTable,
}

impl PlanArtifact {
    /// Split into a version tag and a ready synthesizer
    pub fn into_synthesizer(self) -> Result<(String, PlanSynthesizer)> {
        let missing: Vec<&str> = [
            ("focus_clf", self.focus_clf.is_none()),
            ("scheme_clf", self.scheme_clf.is_none()),
            ("series_reg", self.series_reg.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (self.focus_clf, self.scheme_clf, self.series_reg) {
            (Some(focus), Some(scheme), Some(series)) => {
                let models = PlanModels {
                    focus: Box::new(focus),
                    scheme: Box::new(scheme),
                    series: Box::new(series),
                };
                let tables = PlanTables {
                    grupos: self.grupos,
                    schemes: self.schemes,
                };
                Ok((self.version, PlanSynthesizer::new(models, tables)))
            }
            _ => Err(Error::IncompleteArtifact(format!(
                "missing models: {}",
                missing.join(", ")
            ))),
        }
    }

    pub fn save(&self, path: &Path) -> Result<ArtifactInfo> {
        write_artifact(path, self)
    }
}

/// Loaded plan artifact, shared read-only by request handlers
#[derive(Debug)]
pub struct PlanService {
    synthesizer: PlanSynthesizer,
    version: String,
    info: Option<ArtifactInfo>,
}

impl PlanService {
    pub fn load(path: &Path) -> Result<Self> {
        let (artifact, info): (PlanArtifact, _) = read_artifact(path)?;
        let mut service = Self::from_artifact(artifact)?;
        tracing::info!(version = %service.version, checksum = %info.checksum, "plan artifact ready");
        service.info = Some(info);
        Ok(service)
    }

    pub fn from_artifact(artifact: PlanArtifact) -> Result<Self> {
        let (version, synthesizer) = artifact.into_synthesizer()?;
        Ok(Self {
            synthesizer,
            version,
            info: None,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// File details, absent when built in memory
    pub fn info(&self) -> Option<&ArtifactInfo> {
        self.info.as_ref()
    }

    pub fn synthesizer(&self) -> &PlanSynthesizer {
        &self.synthesizer
    }

    pub fn predict(&self, features: &CanonicalFeatures) -> fitlife_core::Result<PlanPrediction> {
        self.synthesizer.synthesize(features)
    }
}

//! Predictive-model capabilities
//!
//! The plan synthesizer only needs three `predict` capabilities over
//! [`CanonicalFeatures`]. How they were trained is not our concern; artifacts
//! ship them as [`TreeModel`]s, a serializable forest of decision trees.

use crate::features::CanonicalFeatures;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Predicts a categorical label (focus id, scheme id)
pub trait LabelPredictor: Send + Sync {
    fn predict_label(&self, features: &CanonicalFeatures) -> Result<String>;
}

/// Predicts a real value (series count)
pub trait ValuePredictor: Send + Sync {
    fn predict_value(&self, features: &CanonicalFeatures) -> Result<f64>;
}

/// Value stored in a leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafValue {
    Number(f64),
    Label(String),
}

/// Internal split: go left when `x[feature] <= threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNode {
    Split(Split),
    Leaf(LeafValue),
}

impl TreeNode {
    /// Walk the tree for one feature row
    pub fn evaluate(&self, x: &[f64]) -> Result<&LeafValue> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(value) => return Ok(value),
                TreeNode::Split(split) => {
                    let v = x.get(split.feature).ok_or_else(|| {
                        Error::InvalidModel(format!(
                            "split on feature {} but only {} features exist",
                            split.feature,
                            x.len()
                        ))
                    })?;
                    node = if *v <= split.threshold {
                        &split.left
                    } else {
                        &split.right
                    };
                }
            }
        }
    }
}

/// A model shipped inside a plan artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeModel {
    /// Always predicts the same value
    Constant { value: LeafValue },
    /// Ensemble of trees: majority vote for labels, mean for values
    Forest { trees: Vec<TreeNode> },
}

impl TreeModel {
    fn leaves<'a>(&'a self, features: &CanonicalFeatures) -> Result<Vec<&'a LeafValue>> {
        match self {
            TreeModel::Constant { value } => Ok(vec![value]),
            TreeModel::Forest { trees } => {
                if trees.is_empty() {
                    return Err(Error::InvalidModel("forest has no trees".to_string()));
                }
                let x = features.as_array().map(|v| v as f64);
                trees.iter().map(|tree| tree.evaluate(&x)).collect()
            }
        }
    }
}

impl LabelPredictor for TreeModel {
    fn predict_label(&self, features: &CanonicalFeatures) -> Result<String> {
        let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
        for leaf in self.leaves(features)? {
            match leaf {
                LeafValue::Label(label) => *votes.entry(label.as_str()).or_insert(0) += 1,
                LeafValue::Number(n) => {
                    return Err(Error::InvalidModel(format!(
                        "classifier leaf holds a number ({n})"
                    )))
                }
            }
        }

        // BTreeMap iterates in label order, so `>` keeps the smallest label on ties
        let mut best: Option<(&str, usize)> = None;
        for (label, count) in votes {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label.to_string())
            .ok_or_else(|| Error::Prediction("no votes cast".to_string()))
    }
}

impl ValuePredictor for TreeModel {
    fn predict_value(&self, features: &CanonicalFeatures) -> Result<f64> {
        let leaves = self.leaves(features)?;
        let mut sum = 0.0;
        for leaf in &leaves {
            match leaf {
                LeafValue::Number(n) => sum += n,
                LeafValue::Label(label) => {
                    return Err(Error::InvalidModel(format!(
                        "regressor leaf holds a label ({label})"
                    )))
                }
            }
        }
        Ok(sum / leaves.len() as f64)
    }
}

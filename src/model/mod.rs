//! Deployed price model
//!
//! The model is opaque to the rest of the crate: a fixed-width numeric
//! vector goes in, one scalar price comes out. The concrete artifact is a
//! gradient-boosted tree dump exported by the training run, loaded
//! read-only at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::features::AlignedVector;
use crate::{HousingError, Result};

/// A trained model that maps an aligned feature vector to a price
pub trait PriceModel {
    /// Training columns the artifact was fitted on, in order
    fn columns(&self) -> &[String];

    /// Predict one price in AUD
    fn predict(&self, features: &AlignedVector) -> Result<f64>;
}

/// Evaluation metrics recorded when the artifact was exported
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// R-squared on the held-out test split
    pub r2: f64,
    /// Root mean squared error in AUD
    pub rmse: f64,
}

/// One node of a regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TreeNode {
    Split {
        /// Schema position of the feature tested at this node
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A single regression tree, nodes indexed with the root at 0
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Walk the tree for one row. Indices were validated at load time;
    /// children always follow their parent, so the walk terminates.
    fn score(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Gradient-boosted tree ensemble loaded from the exported artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    columns: Vec<String>,
    base_score: f64,
    trees: Vec<RegressionTree>,
    metrics: ModelMetrics,
}

impl TreeEnsemble {
    /// Load the artifact from disk, failing closed on any problem
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HousingError::ModelUnavailable(format!(
                "Failed to read model artifact {}: {}",
                path.display(),
                e
            ))
        })?;
        let ensemble = Self::from_json(&content)?;
        log::info!(
            "Loaded model artifact {} ({} trees, {} columns)",
            path.display(),
            ensemble.trees.len(),
            ensemble.columns.len()
        );
        Ok(ensemble)
    }

    /// Parse and validate an artifact from its JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let ensemble: TreeEnsemble = serde_json::from_str(content)
            .map_err(|e| HousingError::ModelUnavailable(format!("Malformed artifact: {}", e)))?;
        ensemble.validate()?;
        Ok(ensemble)
    }

    /// Structural checks so that scoring can never index out of bounds
    fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(HousingError::ModelUnavailable(
                "Artifact records no training columns".to_string(),
            ));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(HousingError::ModelUnavailable(format!(
                    "Tree {} has no nodes",
                    t
                )));
            }
            for (n, node) in tree.nodes.iter().enumerate() {
                if let TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } = node
                {
                    if *feature >= self.columns.len() {
                        return Err(HousingError::ModelUnavailable(format!(
                            "Tree {} node {} tests feature {} but the artifact has {} columns",
                            t,
                            n,
                            feature,
                            self.columns.len()
                        )));
                    }
                    // Children must follow their parent so walks terminate
                    let in_range = *left < tree.nodes.len() && *right < tree.nodes.len();
                    if !in_range || *left <= n || *right <= n {
                        return Err(HousingError::ModelUnavailable(format!(
                            "Tree {} node {} has invalid children ({}, {})",
                            t, n, left, right
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn metrics(&self) -> &ModelMetrics {
        &self.metrics
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl PriceModel for TreeEnsemble {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn predict(&self, features: &AlignedVector) -> Result<f64> {
        if features.len() != self.columns.len() {
            return Err(HousingError::SchemaMismatch(format!(
                "Aligned vector has {} values but the model expects {}",
                features.len(),
                self.columns.len()
            )));
        }
        let row = features.values();
        let score: f64 = self.trees.iter().map(|tree| tree.score(row)).sum();
        Ok(self.base_score + score)
    }
}

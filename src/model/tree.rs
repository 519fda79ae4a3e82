use anyhow::{anyhow, Result};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: u8,
        distribution: Option<[f64; 2]>,
    },
}

/// Fitted decision tree, stored as a flat node array with node 0 as the root.
/// Split comparison is `value <= threshold` goes left.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Predicted class label for one feature row.
    pub fn predict(&self, row: &[f64]) -> Result<u8> {
        let (class, _) = self.walk_to_leaf(row)?;
        Ok(class)
    }

    /// Two-class probability estimate, `None` when the fitted tree was
    /// exported without leaf distributions.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Option<[f64; 2]>> {
        let (_, distribution) = self.walk_to_leaf(row)?;
        Ok(distribution.map(|d| {
            let total = d[0] + d[1];
            [d[0] / total, d[1] / total]
        }))
    }

    fn walk_to_leaf(&self, row: &[f64]) -> Result<(u8, Option<[f64; 2]>)> {
        let mut idx = 0usize;
        // Child indices always move forward, so one pass over the node
        // array bounds the walk.
        for _ in 0..self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| anyhow!("Tree node index {} out of bounds", idx))?;
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = *row.get(*feature).ok_or_else(|| {
                        anyhow!(
                            "Feature index {} out of bounds for row of {} values",
                            feature,
                            row.len()
                        )
                    })?;
                    idx = if value <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf {
                    class,
                    distribution,
                } => return Ok((*class, *distribution)),
            }
        }
        Err(anyhow!("Tree traversal did not reach a leaf"))
    }

    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(anyhow!("Tree has no nodes"));
        }
        let mut leaves = 0usize;
        let mut with_distribution = 0usize;
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(anyhow!(
                            "Split node {} references feature {} (tree was fitted on {})",
                            idx,
                            feature,
                            n_features
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(anyhow!("Split node {} has a non-finite threshold", idx));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(anyhow!(
                                "Split node {} has invalid child index {}",
                                idx,
                                child
                            ));
                        }
                    }
                }
                TreeNode::Leaf {
                    class,
                    distribution,
                } => {
                    if *class > 1 {
                        return Err(anyhow!(
                            "Leaf node {} carries class {} outside the binary label set",
                            idx,
                            class
                        ));
                    }
                    leaves += 1;
                    if let Some(d) = distribution {
                        with_distribution += 1;
                        if d.iter().any(|p| !p.is_finite() || *p < 0.0) {
                            return Err(anyhow!("Leaf node {} has an invalid distribution", idx));
                        }
                        if d[0] + d[1] <= 0.0 {
                            return Err(anyhow!("Leaf node {} has an empty distribution", idx));
                        }
                    }
                }
            }
        }
        // Probability estimation is a capability of the whole tree.
        if with_distribution != 0 && with_distribution != leaves {
            return Err(anyhow!(
                "Tree mixes leaves with and without class distributions"
            ));
        }
        Ok(())
    }
}

/// Standardization stage bundled with the classifier by the training
/// pipeline. Applied element-wise before tree traversal.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn transform(&self, row: &mut [f64]) -> Result<()> {
        if row.len() != self.mean.len() {
            return Err(anyhow!(
                "Row of {} values does not match scaler fitted on {}",
                row.len(),
                self.mean.len()
            ));
        }
        for (value, (mean, scale)) in row.iter_mut().zip(self.mean.iter().zip(&self.scale)) {
            *value = (*value - mean) / scale;
        }
        Ok(())
    }

    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.mean.len() != n_features || self.scale.len() != n_features {
            return Err(anyhow!(
                "Scaler vectors sized {}/{} do not match {} features",
                self.mean.len(),
                self.scale.len(),
                n_features
            ));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(anyhow!("Scaler contains non-finite entries"));
        }
        if self.scale.iter().any(|s| *s == 0.0) {
            return Err(anyhow!("Scaler contains a zero scale entry"));
        }
        Ok(())
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use bincode::{self as bincode, config as bincode_config, Decode, Encode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::tree::{DecisionTree, StandardScaler};

/// Measurement column names the predict endpoint accepts.
pub const FEATURE_NAMES: [&str; 13] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Artifact location, relative to the directory the service binary is
/// installed in. The working directory plays no part in resolution.
pub const ARTIFACT_RELATIVE_PATH: &str = "model/heart_classifier.bin";

/// Serialized, pre-fitted classifier plus the preprocessing stage bundled
/// with it by the training side. Loaded once at startup and shared
/// read-only across request handlers.
#[derive(Serialize, Deserialize, Encode, Decode, Debug, Clone)]
pub struct ClassifierArtifact {
    /// Column order the classifier was fitted with.
    pub feature_names: Vec<String>,
    pub scaler: Option<StandardScaler>,
    pub tree: DecisionTree,
}

impl ClassifierArtifact {
    pub fn validate(&self) -> Result<()> {
        if self.feature_names.len() != FEATURE_NAMES.len() {
            return Err(anyhow!(
                "Artifact carries {} feature columns, expected {}",
                self.feature_names.len(),
                FEATURE_NAMES.len()
            ));
        }
        for (idx, name) in self.feature_names.iter().enumerate() {
            if !FEATURE_NAMES.contains(&name.as_str()) {
                return Err(anyhow!("Unknown feature column in artifact: {}", name));
            }
            if self.feature_names[..idx].contains(name) {
                return Err(anyhow!("Duplicate feature column in artifact: {}", name));
            }
        }
        if let Some(scaler) = &self.scaler {
            scaler.validate(self.feature_names.len())?;
        }
        self.tree.validate(self.feature_names.len())
    }

    /// Classify one feature row, already ordered per `feature_names`.
    pub fn predict(&self, row: &[f64]) -> Result<u8> {
        let row = self.preprocess(row)?;
        self.tree.predict(&row)
    }

    /// Probability estimate for one feature row, `None` when the fitted
    /// classifier does not expose the capability.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Option<[f64; 2]>> {
        let row = self.preprocess(row)?;
        self.tree.predict_proba(&row)
    }

    fn preprocess(&self, row: &[f64]) -> Result<Vec<f64>> {
        let mut row = row.to_vec();
        if let Some(scaler) = &self.scaler {
            scaler.transform(&mut row)?;
        }
        Ok(row)
    }
}

pub fn default_artifact_path() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to resolve executable path")?;
    let install_dir = exe
        .parent()
        .ok_or_else(|| anyhow!("Executable path has no parent directory"))?;
    Ok(install_dir.join(ARTIFACT_RELATIVE_PATH))
}

pub fn load_artifact(path: &Path) -> Result<ClassifierArtifact> {
    let buf = fs::read(path)
        .with_context(|| format!("Failed to read model artifact at {}", path.display()))?;

    let config = bincode_config::standard()
        .with_fixed_int_encoding()
        .with_little_endian();

    let (artifact, _): (ClassifierArtifact, usize) = bincode::decode_from_slice(&buf, config)
        .map_err(|e| anyhow!("Failed to deserialize model artifact: {}", e))?;
    artifact
        .validate()
        .with_context(|| format!("Incompatible model artifact at {}", path.display()))?;

    info!(
        "Loaded classifier artifact from {} ({} tree nodes, scaler: {})",
        path.display(),
        artifact.tree.nodes.len(),
        artifact.scaler.is_some()
    );
    Ok(artifact)
}

pub fn save_artifact(path: &Path, artifact: &ClassifierArtifact) -> Result<()> {
    let config = bincode_config::standard()
        .with_fixed_int_encoding()
        .with_little_endian();
    let buf = bincode::encode_to_vec(artifact, config)
        .map_err(|e| anyhow!("Failed to serialize model artifact: {}", e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, &buf)
        .with_context(|| format!("Failed to write model artifact to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::TreeNode;
    use tempfile::tempdir;

    fn fitted_artifact() -> ClassifierArtifact {
        let chol = FEATURE_NAMES.iter().position(|n| *n == "chol").unwrap();
        ClassifierArtifact {
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            scaler: Some(StandardScaler {
                mean: vec![0.0; 13],
                scale: vec![1.0; 13],
            }),
            tree: DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: chol,
                        threshold: 240.0,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Leaf {
                        class: 0,
                        distribution: Some([7.0, 1.0]),
                    },
                    TreeNode::Leaf {
                        class: 1,
                        distribution: Some([2.0, 6.0]),
                    },
                ],
            },
        }
    }

    #[test]
    fn save_and_load_roundtrip() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("model/heart_classifier.bin");

        let artifact = fitted_artifact();
        save_artifact(&path, &artifact)?;

        let loaded = load_artifact(&path)?;
        assert_eq!(loaded.feature_names, artifact.feature_names);

        let mut row = vec![0.0; 13];
        row[4] = 233.0; // chol
        assert_eq!(loaded.predict(&row)?, 0);
        row[4] = 280.0;
        assert_eq!(loaded.predict(&row)?, 1);
        Ok(())
    }

    #[test]
    fn missing_artifact_fails_to_load() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nope.bin");
        assert!(load_artifact(&path).is_err());
    }

    #[test]
    fn corrupt_artifact_fails_to_load() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("heart_classifier.bin");
        fs::write(&path, b"not a model")?;
        assert!(load_artifact(&path).is_err());
        Ok(())
    }

    #[test]
    fn unknown_column_fails_to_load() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("heart_classifier.bin");

        let mut artifact = fitted_artifact();
        artifact.feature_names[0] = "bmi".to_string();
        save_artifact(&path, &artifact)?;

        assert!(load_artifact(&path).is_err());
        Ok(())
    }

    #[test]
    fn validate_rejects_duplicate_columns() {
        let mut artifact = fitted_artifact();
        artifact.feature_names[1] = "age".to_string();
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn validate_rejects_short_schema() {
        let mut artifact = fitted_artifact();
        artifact.feature_names.pop();
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_scale() {
        let mut artifact = fitted_artifact();
        artifact.scaler.as_mut().unwrap().scale[3] = 0.0;
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn scaler_is_applied_before_traversal() -> Result<()> {
        let mut artifact = fitted_artifact();
        // Standardize chol around 250 so the raw threshold flips meaning.
        let scaler = artifact.scaler.as_mut().unwrap();
        scaler.mean[4] = 250.0;
        scaler.scale[4] = 10.0;
        if let TreeNode::Split { threshold, .. } = &mut artifact.tree.nodes[0] {
            *threshold = 0.0;
        }

        let mut row = vec![0.0; 13];
        row[4] = 240.0; // (240 - 250) / 10 = -1.0, goes left
        assert_eq!(artifact.predict(&row)?, 0);
        row[4] = 265.0; // 1.5, goes right
        assert_eq!(artifact.predict(&row)?, 1);
        Ok(())
    }
}

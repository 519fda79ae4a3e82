pub mod artifact;
pub mod tree;

// Re-export main components
pub use artifact::{default_artifact_path, load_artifact, save_artifact, ClassifierArtifact};
pub use tree::{DecisionTree, StandardScaler, TreeNode};

use std::path::Path;

use anyhow::{Context, Result};
use cardio_api::model::{save_artifact, ClassifierArtifact};
use clap::Parser;
use tracing::{info, Level};

/// Converts a JSON classifier export, produced by the training side, into
/// the binary artifact the service loads at startup. No fitting happens
/// here.
#[derive(Parser, Debug)]
#[command(author, version, about = "Pack a JSON classifier export into the binary artifact format")]
struct Args {
    /// JSON export of the fitted classifier.
    #[arg(short, long)]
    input: String,

    /// Destination artifact file.
    #[arg(short, long, default_value = "model/heart_classifier.bin")]
    output: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let args = Args::parse();

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read classifier export from {}", args.input))?;
    let artifact: ClassifierArtifact =
        serde_json::from_str(&data).context("Failed to parse classifier export")?;
    artifact.validate()?;

    save_artifact(Path::new(&args.output), &artifact)?;
    info!(
        "Packed {} tree nodes into {}",
        artifact.tree.nodes.len(),
        args.output
    );
    Ok(())
}

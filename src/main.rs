use anyhow::Result;
use cardio_api::api::PredictionGateway;
use cardio_api::model::{default_artifact_path, load_artifact};
use cardio_api::util::cmd::Args;
use clap::Parser;
use std::sync::Arc;
#[cfg(target_os = "linux")]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    //parse args
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    // The artifact loads exactly once; a missing or corrupt file aborts
    // startup, there is no fallback model.
    let artifact_path = default_artifact_path()?;
    let classifier = Arc::new(load_artifact(&artifact_path)?);
    let gateway = Arc::new(PredictionGateway::new(classifier));

    // Create a channel to signal when to stop serving
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        #[cfg(target_os = "linux")]
        {
            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to create SIGTERM listener");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("Failed to create SIGINT listener");

            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(target_os = "linux"))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                info!("Failed to listen for Ctrl-C: {}", e);
            }
        }

        // Send shutdown signal
        let _ = shutdown_tx.send(());
    });

    tokio::select! {
        res = gateway.run(&args.bind_addr, args.port) => res,
        _ = &mut shutdown_rx => {
            info!("Shutdown signal received, stopping server...");
            Ok(())
        }
    }
}

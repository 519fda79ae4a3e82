use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::api::handlers;
use crate::model::ClassifierArtifact;

/// Prediction Gateway - owns the loaded classifier and exposes the HTTP API
pub struct PredictionGateway {
    pub classifier: Arc<ClassifierArtifact>,
}

impl PredictionGateway {
    pub fn new(classifier: Arc<ClassifierArtifact>) -> Self {
        Self { classifier }
    }

    /// Run the prediction API server
    pub async fn run(self: Arc<Self>, bind_addr: &str, port: u16) -> Result<()> {
        let app = self.create_router();
        let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port)).await?;

        info!("Prediction API listening on {}:{}", bind_addr, port);
        axum::serve(listener, app).await.map_err(Into::into)
    }

    /// Create API router for the liveness and predict endpoints
    pub fn create_router(self: Arc<Self>) -> Router {
        let state = Arc::clone(&self);
        // Wildcard origin with credentials disabled; browsers reject the
        // other pairing.
        Router::new()
            .route("/", get(handlers::liveness))
            .route("/predict", post(handlers::predict))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}

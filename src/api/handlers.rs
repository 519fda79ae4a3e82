use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::api::gateway::PredictionGateway;
use crate::api::models::{ClassProbabilities, HeartMeasurements, PredictionResponse};

/// Liveness check, succeeds for as long as the process is up
pub async fn liveness() -> Json<serde_json::Value> {
    Json(json!({"message": "Heart Disease Prediction API is running"}))
}

/// Handle prediction requests
pub async fn predict(
    State(gateway): State<Arc<PredictionGateway>>,
    payload: Result<Json<HeartMeasurements>, JsonRejection>,
) -> Response {
    // Malformed bodies are rejected before the classifier is ever touched.
    let Json(measurements) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let error_response = json!({
                "error": {
                    "message": rejection.body_text(),
                    "type": "invalid_request_error",
                    "code": 422
                }
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(error_response)).into_response();
        }
    };

    match run_prediction(&gateway, &measurements) {
        Ok(response) => {
            info!(
                "Prediction for input {:?}: {}, probabilities: {:?}",
                measurements, response.prediction, response.probabilities
            );
            Json(response).into_response()
        }
        Err(e) => {
            error!("Prediction failed: {}", e);
            let error_response = json!({
                "error": {
                    "message": "Internal server error occurred while processing the request.",
                    "type": "api_error",
                    "code": 500
                }
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response()
        }
    }
}

fn run_prediction(
    gateway: &PredictionGateway,
    measurements: &HeartMeasurements,
) -> anyhow::Result<PredictionResponse> {
    let row = measurements.feature_row(&gateway.classifier.feature_names)?;

    let prediction = gateway.classifier.predict(&row)?;
    let probabilities = gateway
        .classifier
        .predict_proba(&row)?
        .map(|p| ClassProbabilities {
            healthy: p[0] * 100.0,
            heart_disease: p[1] * 100.0,
        });

    let status = if prediction == 0 {
        "Healthy"
    } else {
        "Heart Disease Detected"
    };

    Ok(PredictionResponse {
        prediction,
        probabilities,
        status: status.to_string(),
    })
}

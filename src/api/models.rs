use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// One set of clinical measurements, as accepted by the predict endpoint.
/// All thirteen fields are required; values are passed to the classifier
/// unchanged, with no range checks on the categorical codes.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartMeasurements {
    pub age: i64,
    pub sex: i64,
    pub cp: i64,
    pub trestbps: i64,
    pub chol: i64,
    pub fbs: i64,
    pub restecg: i64,
    pub thalach: i64,
    pub exang: i64,
    pub oldpeak: f64,
    pub slope: i64,
    pub ca: i64,
    pub thal: i64,
}

impl HeartMeasurements {
    /// Numeric value of a single measurement, addressed by column name.
    pub fn value(&self, name: &str) -> Option<f64> {
        let value = match name {
            "age" => self.age as f64,
            "sex" => self.sex as f64,
            "cp" => self.cp as f64,
            "trestbps" => self.trestbps as f64,
            "chol" => self.chol as f64,
            "fbs" => self.fbs as f64,
            "restecg" => self.restecg as f64,
            "thalach" => self.thalach as f64,
            "exang" => self.exang as f64,
            "oldpeak" => self.oldpeak,
            "slope" => self.slope as f64,
            "ca" => self.ca as f64,
            "thal" => self.thal as f64,
            _ => return None,
        };
        Some(value)
    }

    /// Build the single-row feature vector in the column order the
    /// classifier was fitted with. Alignment is by column name, never by
    /// position in the request body.
    pub fn feature_row(&self, columns: &[String]) -> Result<Vec<f64>> {
        columns
            .iter()
            .map(|column| {
                self.value(column)
                    .ok_or_else(|| anyhow!("Unknown feature column: {}", column))
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct ClassProbabilities {
    #[serde(rename = "Healthy")]
    pub healthy: f64,
    #[serde(rename = "Heart Disease")]
    pub heart_disease: f64,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: u8,
    /// `null` on the wire when the classifier has no probability support.
    pub probabilities: Option<ClassProbabilities>,
    pub status: String,
}

//! HTTP request handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::extract::ImageUpload;
use crate::engine::Classifier;
use crate::error::PredictError;
use crate::store::{SignatureOptions, TensorSpec};
use crate::vision::Prediction;

/// Shared application state
pub struct AppState {
    pub classifier: Arc<Classifier>,
}

impl AppState {
    pub fn new(classifier: Arc<Classifier>) -> Self {
        Self { classifier }
    }
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Describe the served artifact
pub async fn list_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let data = state
        .classifier
        .meta()
        .map(|meta| ModelInfo {
            id: format!("{}:{}", meta.name, meta.version),
            name: meta.name.clone(),
            version: meta.version.clone(),
            created: meta.created_at,
            input: meta.input.clone(),
            output: meta.output.clone(),
            signatures: meta.signatures.clone(),
        })
        .into_iter()
        .collect();

    Json(ModelsResponse {
        object: "list".to_string(),
        top_k: state.classifier.top_k(),
        data,
    })
}

/// Classify an uploaded image
pub async fn predict(
    State(state): State<Arc<AppState>>,
    ImageUpload(image): ImageUpload,
) -> Result<Json<Vec<Prediction>>, PredictError> {
    let classifier = Arc::clone(&state.classifier);
    let predictions = classifier.predict(image.to_vec()).await?;
    if let Some(best) = predictions.first() {
        tracing::debug!("Top prediction: {} ({:.4})", best.label, best.score);
    }
    Ok(Json(predictions))
}

// Response types

#[derive(Serialize)]
pub struct ModelsResponse {
    pub object: String,
    pub top_k: usize,
    pub data: Vec<ModelInfo>,
}

#[derive(Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub created: DateTime<Utc>,
    pub input: TensorSpec,
    pub output: TensorSpec,
    pub signatures: BTreeMap<String, SignatureOptions>,
}

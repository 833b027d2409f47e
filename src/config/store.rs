//! Model store and prediction settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable overriding the default store location
pub const STORE_ENV: &str = "RESNET_SERVE_STORE";

/// Name the exporter registers the ResNet50 graph under
pub const DEFAULT_MODEL_NAME: &str = "onnx_resnet50";

/// Location of the model store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory of the store
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    std::env::var(STORE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./model_store"))
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Which artifact to serve and how many classes to report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    /// Model tag, `name[:version]`
    #[serde(default = "default_model")]
    pub model: String,

    /// Number of top classes returned per image
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_model() -> String {
    format!("{}:latest", DEFAULT_MODEL_NAME)
}

fn default_top_k() -> usize {
    1
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            top_k: default_top_k(),
        }
    }
}

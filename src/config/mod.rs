//! Configuration system for resnet-serve
//!
//! A single YAML (or JSON) document covers the store location, the HTTP
//! server and prediction defaults. Every key is optional; CLI flags win over
//! file values.

mod server;
mod store;

pub use server::{CorsConfig, ServerConfig};
pub use store::{PredictConfig, StoreConfig, DEFAULT_MODEL_NAME, STORE_ENV};

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model store location
    #[serde(default)]
    pub store: StoreConfig,

    /// Server settings (only for `resnet-serve serve`)
    #[serde(default)]
    pub server: ServerConfig,

    /// Artifact selection and decoding
    #[serde(default)]
    pub predict: PredictConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading config {}", path.as_ref().display()))?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading config {}", path.as_ref().display()))?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from an optional path, picking the parser by extension.
    ///
    /// With no path, defaults apply (including `RESNET_SERVE_STORE`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) => match p.extension().and_then(|e| e.to_str()) {
                Some("json") => Self::from_json(p),
                _ => Self::from_yaml(p),
            },
        }
    }
}

//! resnet-serve - ResNet50 image classification over HTTP
//!
//! Two halves with no shared runtime state:
//!
//! - **export**: import a converted ONNX graph and its label table into a
//!   named, versioned model store and point the `latest` tag at it
//! - **serve**: resolve `onnx_resnet50:latest`, build a classifier once,
//!   and answer `POST /predict` with the top ImageNet classes
//!
//! Graphs run on tract, a pure-Rust ONNX runtime.
//!
//! # Example
//!
//! ```bash
//! # Register a converted graph
//! resnet-serve export --graph resnet50.onnx --labels imagenet_class_index.json
//!
//! # Start server
//! resnet-serve serve --port 3000
//!
//! # Classify
//! curl --data-binary @elephant.jpg http://localhost:3000/predict
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod exporter;
pub mod loader;
pub mod server;
pub mod store;
pub mod vision;

// Re-export key types
pub use config::{AppConfig, ServerConfig};
pub use engine::{Classifier, OnnxRunner, Runner};
pub use error::PredictError;
pub use exporter::{export_model, ExportOptions};
pub use store::{Artifact, ModelStore, ModelTag};
pub use vision::{LabelTable, Prediction};

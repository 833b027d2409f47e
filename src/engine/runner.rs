//! Model runners
//!
//! A runner owns a loaded graph and executes one call at a time on the
//! calling thread. It is shared read-only across requests.

use tract_onnx::prelude::tract_ndarray::Array4;
use tract_onnx::prelude::*;

use crate::error::PredictError;
use crate::loader::{self, RunnableGraph};
use crate::store::Artifact;

/// Executes a model on a preprocessed batch
pub trait Runner: Send + Sync {
    /// Input shape the runner accepts, e.g. `[1, 224, 224, 3]`
    fn input_shape(&self) -> &[usize];

    /// Run the model and return the flattened scores of the first output
    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, PredictError>;
}

/// Shape check shared by runner implementations
pub fn check_input_shape(expected: &[usize], input: &Array4<f32>) -> Result<(), PredictError> {
    if input.shape() != expected {
        return Err(PredictError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: input.shape().to_vec(),
        });
    }
    Ok(())
}

/// Runner backed by a tract plan loaded from a store artifact
pub struct OnnxRunner {
    plan: RunnableGraph,
    input_shape: Vec<usize>,
}

impl OnnxRunner {
    /// Load the artifact's graph under its recorded input signature
    pub fn from_artifact(artifact: &Artifact) -> anyhow::Result<Self> {
        let loaded = loader::load_graph(artifact.graph_path(), &artifact.meta.input)?;
        if loaded.output.shape != artifact.meta.output.shape {
            tracing::warn!(
                "Graph output {:?} differs from recorded {:?}",
                loaded.output.shape,
                artifact.meta.output.shape
            );
        }
        Ok(Self {
            plan: loaded.plan,
            input_shape: loaded.input_shape,
        })
    }
}

impl Runner for OnnxRunner {
    fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, PredictError> {
        check_input_shape(&self.input_shape, &input)?;

        let tensor: Tensor = input.into();
        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| PredictError::Inference(format!("{:#}", e)))?;

        let first = outputs
            .first()
            .ok_or_else(|| PredictError::Inference("model returned no outputs".to_string()))?;
        let scores = first
            .to_array_view::<f32>()
            .map_err(|e| PredictError::Inference(format!("{:#}", e)))?;
        Ok(scores.iter().copied().collect())
    }
}

//! ONNX graph loading
//!
//! Graphs are loaded with tract, pinned to a concrete single-sample input
//! shape, then type-checked and optimized. A graph that survives this is
//! ready to run; a graph that doesn't is rejected at export time rather
//! than on the first request.

mod source;

pub use source::{detect_graph, Source};

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::store::TensorSpec;

/// An optimized, runnable tract plan
pub type RunnableGraph =
    RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A graph ready for execution, plus what loading learned about it
pub struct LoadedGraph {
    pub plan: RunnableGraph,
    /// Concrete input shape the plan was built for
    pub input_shape: Vec<usize>,
    /// Output spec with the batch dimension left dynamic
    pub output: TensorSpec,
}

/// Load an ONNX graph under the declared input signature
pub fn load_graph<P: AsRef<Path>>(path: P, input: &TensorSpec) -> Result<LoadedGraph> {
    let path = path.as_ref();
    if input.dtype != "float32" {
        return Err(anyhow!(
            "unsupported input dtype {} (only float32 graphs are served)",
            input.dtype
        ));
    }
    let input_shape = input.concrete_shape();

    let start = std::time::Instant::now();
    let model = tract_onnx::onnx()
        .model_for_path(path)
        .with_context(|| format!("reading ONNX graph {}", path.display()))?
        .with_input_fact(0, f32::fact(input_shape.clone()).into())
        .context("declaring input signature")?
        .into_optimized()
        .with_context(|| {
            format!(
                "graph {} is not compatible with input {:?}",
                path.display(),
                input_shape
            )
        })?;

    let output_outlet = model
        .output_outlets()?
        .first()
        .copied()
        .ok_or_else(|| anyhow!("graph {} has no outputs", path.display()))?;
    let output_name = model.node(output_outlet.node).name.clone();
    let output_fact = model.output_fact(0)?;
    let output_shape = output_fact
        .shape
        .as_concrete()
        .ok_or_else(|| anyhow!("output shape of {} is not concrete", path.display()))?
        .to_vec();

    let plan = model.into_runnable()?;
    tracing::debug!(
        "Loaded {} in {:?} (output {:?})",
        path.display(),
        start.elapsed(),
        output_shape
    );

    Ok(LoadedGraph {
        plan,
        input_shape,
        output: output_spec(&output_name, &output_shape),
    })
}

/// Leading batch dimension becomes dynamic again in the recorded spec.
fn output_spec(name: &str, shape: &[usize]) -> TensorSpec {
    let dims = shape
        .iter()
        .enumerate()
        .map(|(i, d)| if i == 0 { None } else { Some(*d) })
        .collect();
    TensorSpec::f32(name, dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_spec_frees_batch_dim() {
        let spec = output_spec("probs", &[1, 1000]);
        assert_eq!(spec.shape, vec![None, Some(1000)]);
        assert_eq!(spec.name, "probs");
    }

    #[test]
    fn test_load_rejects_missing_and_garbage() {
        let input = TensorSpec::f32("input", vec![None, Some(224), Some(224), Some(3)]);
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(load_graph(tmp.path().join("missing.onnx"), &input).is_err());

        let garbage = tmp.path().join("garbage.onnx");
        std::fs::write(&garbage, b"\x00\x01not protobuf at all").unwrap();
        assert!(load_graph(&garbage, &input).is_err());
    }

    #[test]
    fn test_load_rejects_non_float_input() {
        let input = TensorSpec {
            name: "input".to_string(),
            dtype: "uint8".to_string(),
            shape: vec![None, Some(224), Some(224), Some(3)],
        };
        assert!(load_graph("irrelevant.onnx", &input).is_err());
    }
}

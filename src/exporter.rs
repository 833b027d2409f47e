//! Model exporter
//!
//! Imports a pretrained classification graph into the model store. The
//! graph is loaded and optimized under the declared input signature before
//! anything is written, so an incompatible graph never reaches the store.

use anyhow::{anyhow, Context, Result};

use crate::config::DEFAULT_MODEL_NAME;
use crate::loader::{self, detect_graph, Source};
use crate::store::{format_shape, Artifact, ModelStore, NewArtifact, TensorSpec};
use crate::vision::{LabelTable, PreprocessMode};

/// Name of the declared graph input
pub const INPUT_NAME: &str = "input";

/// What to export and under which name
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Store name, e.g. `onnx_resnet50`
    pub name: String,
    /// Explicit version; generated when `None`
    pub version: Option<String>,
    /// Converted ONNX graph
    pub graph: Source,
    /// `imagenet_class_index.json`-style label table
    pub labels: Source,
    /// Declared input signature
    pub input: TensorSpec,
    pub preprocess: PreprocessMode,
}

/// NHWC float input with a dynamic batch dimension
pub fn image_input(height: usize, width: usize) -> TensorSpec {
    TensorSpec::f32(INPUT_NAME, vec![None, Some(height), Some(width), Some(3)])
}

impl Default for ExportOptions {
    /// Keras ResNet50 with ImageNet weights, converted at opset 13
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            version: None,
            graph: Source::Local("./resnet50.onnx".into()),
            labels: Source::Local("./imagenet_class_index.json".into()),
            input: image_input(224, 224),
            preprocess: PreprocessMode::Caffe,
        }
    }
}

/// Validate and store a graph. Blocks on file and network I/O.
pub fn export_model(store: &ModelStore, opts: &ExportOptions) -> Result<Artifact> {
    opts.input
        .image_size()
        .context("export only supports NHWC RGB image inputs")?;

    let graph_path = match &opts.graph {
        Source::Local(path) => detect_graph(path)?,
        hub => hub.fetch()?,
    };
    let labels_path = opts.labels.fetch()?;

    tracing::info!(
        "Converting {} with input {} {}",
        graph_path.display(),
        opts.input.name,
        format_shape(&opts.input.shape)
    );
    let loaded = loader::load_graph(&graph_path, &opts.input)
        .with_context(|| format!("converting {}", opts.graph))?;
    tracing::info!("Graph output {}", format_shape(&loaded.output.shape));

    let labels = LabelTable::from_file(&labels_path)?;
    let classes = loaded.output.shape.last().copied().flatten();
    if classes != Some(labels.len()) {
        return Err(anyhow!(
            "label table {} has {} classes but the graph outputs {}",
            opts.labels,
            labels.len(),
            format_shape(&loaded.output.shape)
        ));
    }

    store.save(
        &opts.name,
        opts.version.as_deref(),
        NewArtifact {
            graph: &graph_path,
            labels: &labels_path,
            source: opts.graph.to_string(),
            preprocess: opts.preprocess,
            input: opts.input.clone(),
            output: loaded.output,
        },
    )
}

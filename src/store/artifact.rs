//! Artifact metadata persisted next to each stored graph

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tag::ModelTag;
use crate::vision::PreprocessMode;

pub const GRAPH_FILE: &str = "model.onnx";
pub const LABELS_FILE: &str = "labels.json";
pub const META_FILE: &str = "artifact.yaml";

/// Declared tensor at a graph boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorSpec {
    pub name: String,
    pub dtype: String,
    /// `None` marks a dynamic dimension
    pub shape: Vec<Option<usize>>,
}

impl TensorSpec {
    pub fn f32(name: &str, shape: Vec<Option<usize>>) -> Self {
        Self {
            name: name.to_string(),
            dtype: "float32".to_string(),
            shape,
        }
    }

    /// Shape of a single-sample call: dynamic dimensions bound to 1
    pub fn concrete_shape(&self) -> Vec<usize> {
        self.shape.iter().map(|d| d.unwrap_or(1)).collect()
    }

    /// Spatial size `(height, width)` of an NHWC image input
    pub fn image_size(&self) -> Result<(u32, u32)> {
        match self.shape.as_slice() {
            [_, Some(h), Some(w), Some(3)] => Ok((u32::try_from(*h)?, u32::try_from(*w)?)),
            _ => Err(anyhow!(
                "input {} is not an NHWC RGB image spec: {}",
                self.name,
                format_shape(&self.shape)
            )),
        }
    }
}

/// Render a shape with `?` for dynamic dimensions
pub fn format_shape(shape: &[Option<usize>]) -> String {
    let dims: Vec<String> = shape
        .iter()
        .map(|d| d.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string()))
        .collect();
    format!("[{}]", dims.join(", "))
}

/// Options attached to a graph entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignatureOptions {
    /// Calls may be merged along the batch dimension
    #[serde(default)]
    pub batchable: bool,
}

/// Default signature map: a single batchable `run` entry point
pub fn default_signatures() -> BTreeMap<String, SignatureOptions> {
    let mut signatures = BTreeMap::new();
    signatures.insert("run".to_string(), SignatureOptions { batchable: true });
    signatures
}

/// Contents of `artifact.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub name: String,
    pub version: String,
    pub created_at: DateTime<Utc>,
    /// Where the graph was imported from (path or `hf://` URI)
    pub source: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub preprocess: PreprocessMode,
    pub input: TensorSpec,
    pub output: TensorSpec,
    #[serde(default = "default_signatures")]
    pub signatures: BTreeMap<String, SignatureOptions>,
}

/// A resolved artifact directory
#[derive(Debug, Clone)]
pub struct Artifact {
    pub meta: ArtifactMeta,
    pub dir: PathBuf,
}

impl Artifact {
    /// Read an artifact directory written by [`super::ModelStore::save`]
    pub fn open(dir: &Path) -> Result<Self> {
        let meta_path = dir.join(META_FILE);
        let content = std::fs::read_to_string(&meta_path)
            .with_context(|| format!("reading {}", meta_path.display()))?;
        let meta: ArtifactMeta = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", meta_path.display()))?;
        Ok(Self {
            meta,
            dir: dir.to_path_buf(),
        })
    }

    pub fn tag(&self) -> ModelTag {
        ModelTag {
            name: self.meta.name.clone(),
            version: self.meta.version.clone(),
        }
    }

    pub fn graph_path(&self) -> PathBuf {
        self.dir.join(GRAPH_FILE)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.dir.join(LABELS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size_from_nhwc_spec() {
        let spec = TensorSpec::f32("input", vec![None, Some(224), Some(224), Some(3)]);
        assert_eq!(spec.image_size().unwrap(), (224, 224));
        assert_eq!(spec.concrete_shape(), vec![1, 224, 224, 3]);
    }

    #[test]
    fn test_image_size_rejects_nchw() {
        let spec = TensorSpec::f32("input", vec![None, Some(3), Some(224), Some(224)]);
        assert!(spec.image_size().is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_image_size_rejects_oversized_dims() {
        let huge = u32::MAX as usize + 1;
        let spec = TensorSpec::f32("input", vec![None, Some(huge), Some(224), Some(3)]);
        assert!(spec.image_size().is_err());
    }

    #[test]
    fn test_format_shape() {
        assert_eq!(format_shape(&[None, Some(1000)]), "[?, 1000]");
    }
}

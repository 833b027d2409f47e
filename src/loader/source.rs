//! Artifact source detection
//!
//! A source is either a local path or a `hf://<owner>/<repo>/<file>` URI
//! fetched through the Hugging Face Hub cache.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use hf_hub::api::sync::Api;

const HUB_SCHEME: &str = "hf://";

/// Where an exported file comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// File or directory on local disk
    Local(PathBuf),
    /// File inside a Hugging Face Hub model repository
    Hub { repo: String, file: String },
}

impl FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some(rest) = s.strip_prefix(HUB_SCHEME) else {
            return Ok(Source::Local(PathBuf::from(s)));
        };

        let mut parts = rest.splitn(3, '/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), Some(file))
                if !owner.is_empty() && !repo.is_empty() && !file.is_empty() =>
            {
                Ok(Source::Hub {
                    repo: format!("{}/{}", owner, repo),
                    file: file.to_string(),
                })
            }
            _ => Err(anyhow!(
                "expected {}<owner>/<repo>/<file>, got {:?}",
                HUB_SCHEME,
                s
            )),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Local(path) => write!(f, "{}", path.display()),
            Source::Hub { repo, file } => write!(f, "{}{}/{}", HUB_SCHEME, repo, file),
        }
    }
}

impl Source {
    /// Materialize the source as a local file, downloading if needed.
    ///
    /// Blocks on network I/O for hub sources.
    pub fn fetch(&self) -> Result<PathBuf> {
        match self {
            Source::Local(path) => Ok(path.clone()),
            Source::Hub { repo, file } => {
                tracing::info!("Downloading {} from {}", file, repo);
                let api = Api::new()?;
                let path = api
                    .model(repo.clone())
                    .get(file)
                    .with_context(|| format!("downloading {}", self))?;
                tracing::info!("Cached at {}", path.display());
                Ok(path)
            }
        }
    }
}

/// Find the ONNX graph for a local path
///
/// The path can be:
/// - A direct path to a .onnx file
/// - A directory containing `model.onnx`
/// - A directory containing exactly one `.onnx` file
pub fn detect_graph<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();

    if path.is_file() {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            "onnx" => Ok(path.to_path_buf()),
            _ => Err(anyhow!("Unsupported model file format: .{}", ext)),
        }
    } else if path.is_dir() {
        detect_graph_in_directory(path)
    } else {
        Err(anyhow!("Model path does not exist: {}", path.display()))
    }
}

fn detect_graph_in_directory(dir: &Path) -> Result<PathBuf> {
    let preferred = dir.join("model.onnx");
    if preferred.is_file() {
        return Ok(preferred);
    }

    let candidates = find_onnx_in_dir(dir);
    match candidates.as_slice() {
        [single] => Ok(single.clone()),
        [] => Err(anyhow!(
            "No ONNX graph found in directory: {}",
            dir.display()
        )),
        _ => Err(anyhow!(
            "Several ONNX graphs in {}; pass the file path instead",
            dir.display()
        )),
    }
}

fn find_onnx_in_dir(dir: &Path) -> Vec<PathBuf> {
    let pattern = dir.join("*.onnx");
    let Some(pattern) = pattern.to_str() else {
        return Vec::new();
    };
    glob::glob(pattern)
        .map(|paths| paths.filter_map(|r| r.ok()).collect())
        .unwrap_or_default()
}

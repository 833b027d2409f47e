//! Versioned model store
//!
//! Artifacts live under `<root>/<name>/<version>/`. A `latest` text file next
//! to the version directories names the version the `latest` tag resolves
//! to. Version directories are written under a staging name and renamed into
//! place, so a reader never sees a half-written artifact.

mod artifact;
mod tag;

pub use artifact::{
    default_signatures, format_shape, Artifact, ArtifactMeta, SignatureOptions, TensorSpec,
    GRAPH_FILE, LABELS_FILE, META_FILE,
};
pub use tag::{ModelTag, LATEST};

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;

/// Files and metadata for a new artifact
#[derive(Debug, Clone)]
pub struct NewArtifact<'a> {
    pub graph: &'a Path,
    pub labels: &'a Path,
    pub source: String,
    pub preprocess: crate::vision::PreprocessMode,
    pub input: TensorSpec,
    pub output: TensorSpec,
}

/// Summary of one model name in the store
#[derive(Debug, Clone)]
pub struct StoredModel {
    pub name: String,
    /// Versions, oldest first
    pub versions: Vec<String>,
    pub latest: Option<String>,
}

/// Filesystem-backed model store
#[derive(Debug, Clone)]
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generate a time-sortable version string
    pub fn new_version() -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}", Utc::now().format("%Y%m%d%H%M%S"), &suffix[..8])
    }

    /// Persist an artifact and move `latest` to it.
    ///
    /// An existing directory for the same version is replaced.
    pub fn save(&self, name: &str, version: Option<&str>, new: NewArtifact<'_>) -> Result<Artifact> {
        let version = match version {
            Some(v) => v.to_string(),
            None => Self::new_version(),
        };
        let tag = ModelTag::new(name, &version)?;
        if tag.is_latest() {
            return Err(anyhow!("'{}' is reserved and cannot be used as a version", LATEST));
        }

        let model_dir = self.root.join(&tag.name);
        std::fs::create_dir_all(&model_dir)
            .with_context(|| format!("creating {}", model_dir.display()))?;

        let staging = model_dir.join(format!(".{}.partial", tag.version));
        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }

        if let Err(e) = write_artifact_dir(&staging, &tag, new) {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(e);
        }

        let final_dir = model_dir.join(&tag.version);
        if final_dir.exists() {
            tracing::info!("Replacing existing artifact {}", tag);
        }
        if let Err(e) = move_into_place(&staging, &final_dir) {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(e);
        }

        self.set_latest(&tag.name, &tag.version)?;
        tracing::info!("Stored {} at {}", tag, final_dir.display());

        Artifact::open(&final_dir)
    }

    /// Resolve a tag to a stored artifact
    pub fn resolve(&self, tag: &ModelTag) -> Result<Artifact> {
        let version = if tag.is_latest() {
            self.latest_version(&tag.name)?
                .ok_or_else(|| anyhow!("Model not found: {}", tag))?
        } else {
            tag.version.clone()
        };

        let dir = self.root.join(&tag.name).join(&version);
        if !dir.is_dir() {
            return Err(anyhow!("Model not found: {}:{}", tag.name, version));
        }
        Artifact::open(&dir)
    }

    /// Resolve a tag given in text form
    pub fn get(&self, tag: &str) -> Result<Artifact> {
        self.resolve(&tag.parse()?)
    }

    /// Version the `latest` tag currently points at
    pub fn latest_version(&self, name: &str) -> Result<Option<String>> {
        let pointer = self.root.join(name).join(LATEST);
        match std::fs::read_to_string(&pointer) {
            Ok(content) => Ok(Some(content.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", pointer.display())),
        }
    }

    fn set_latest(&self, name: &str, version: &str) -> Result<()> {
        let model_dir = self.root.join(name);
        let tmp = model_dir.join(format!(".{}.tmp", LATEST));
        std::fs::write(&tmp, format!("{}\n", version))?;
        std::fs::rename(&tmp, model_dir.join(LATEST))
            .with_context(|| format!("updating latest tag for {}", name))?;
        Ok(())
    }

    /// Versions stored for `name`, oldest first
    pub fn versions(&self, name: &str) -> Result<Vec<String>> {
        let model_dir = self.root.join(name);
        let mut versions = Vec::new();
        if !model_dir.is_dir() {
            return Ok(versions);
        }

        for entry in std::fs::read_dir(&model_dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with('.') {
                continue;
            }
            if entry.path().join(META_FILE).is_file() {
                versions.push(file_name);
            }
        }
        versions.sort();
        Ok(versions)
    }

    /// List every model in the store
    pub fn list(&self) -> Result<Vec<StoredModel>> {
        let mut models = Vec::new();
        if !self.root.exists() {
            return Ok(models);
        }

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let versions = self.versions(&name)?;
            if versions.is_empty() {
                continue;
            }
            models.push(StoredModel {
                latest: self.latest_version(&name)?,
                name,
                versions,
            });
        }
        models.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(models)
    }
}

/// Rename `staging` to `target`. An existing `target` is set aside first and
/// only deleted once the new directory is in place; on failure it is restored.
fn move_into_place(staging: &Path, target: &Path) -> Result<()> {
    let previous = target.exists().then(|| {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        target.with_file_name(format!(".{}.old", name))
    });

    if let Some(old) = &previous {
        if old.exists() {
            std::fs::remove_dir_all(old)?;
        }
        std::fs::rename(target, old)
            .with_context(|| format!("setting aside {}", target.display()))?;
    }

    if let Err(e) = std::fs::rename(staging, target) {
        if let Some(old) = &previous {
            if let Err(restore) = std::fs::rename(old, target) {
                tracing::error!("Failed to restore {}: {}", target.display(), restore);
            }
        }
        return Err(e).with_context(|| format!("moving artifact into {}", target.display()));
    }

    if let Some(old) = &previous {
        if let Err(e) = std::fs::remove_dir_all(old) {
            tracing::warn!("Failed to remove {}: {}", old.display(), e);
        }
    }
    Ok(())
}

fn write_artifact_dir(dir: &Path, tag: &ModelTag, new: NewArtifact<'_>) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let size_bytes = std::fs::copy(new.graph, dir.join(GRAPH_FILE))
        .with_context(|| format!("copying graph {}", new.graph.display()))?;
    std::fs::copy(new.labels, dir.join(LABELS_FILE))
        .with_context(|| format!("copying labels {}", new.labels.display()))?;

    let meta = ArtifactMeta {
        name: tag.name.clone(),
        version: tag.version.clone(),
        created_at: Utc::now(),
        source: new.source,
        size_bytes,
        preprocess: new.preprocess,
        input: new.input,
        output: new.output,
        signatures: default_signatures(),
    };
    std::fs::write(dir.join(META_FILE), serde_yaml::to_string(&meta)?)?;
    Ok(())
}

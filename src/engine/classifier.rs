//! Image classifier
//!
//! Ties preprocessing, a runner and the label table into the single
//! `predict(image) -> predictions` operation the server exposes.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::sync::Semaphore;

use super::runner::{OnnxRunner, Runner};
use crate::error::PredictError;
use crate::store::{ArtifactMeta, ModelStore, ModelTag};
use crate::vision::{LabelTable, Prediction, Preprocessor};

/// Immutable classification pipeline, built once at startup
pub struct Classifier {
    preprocessor: Preprocessor,
    runner: Arc<dyn Runner>,
    labels: LabelTable,
    top_k: usize,
    permits: Arc<Semaphore>,
    meta: Option<ArtifactMeta>,
}

impl Classifier {
    /// Assemble a classifier from its parts
    pub fn new(
        preprocessor: Preprocessor,
        runner: Arc<dyn Runner>,
        labels: LabelTable,
        top_k: usize,
        max_concurrent: usize,
    ) -> Self {
        Self {
            preprocessor,
            runner,
            labels,
            top_k: top_k.max(1),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            meta: None,
        }
    }

    /// Resolve `tag` in the store and load its graph and labels
    pub fn from_store(
        store: &ModelStore,
        tag: &ModelTag,
        top_k: usize,
        max_concurrent: usize,
    ) -> Result<Self> {
        let artifact = store
            .resolve(tag)
            .with_context(|| format!("resolving {} in {}", tag, store.root().display()))?;
        tracing::info!("Loading {} from {}", artifact.tag(), artifact.dir.display());

        let (height, width) = artifact.meta.input.image_size()?;
        let preprocessor = Preprocessor::new(height, width, artifact.meta.preprocess);
        let labels = LabelTable::from_file(artifact.labels_path())?;
        let runner = OnnxRunner::from_artifact(&artifact)?;
        let expected = [1, height as usize, width as usize, 3];
        if runner.input_shape() != expected {
            return Err(anyhow!(
                "{} graph expects input {:?}, preprocessing produces {:?}",
                artifact.tag(),
                runner.input_shape(),
                expected
            ));
        }

        let classes = artifact.meta.output.shape.last().copied().flatten();
        if classes != Some(labels.len()) {
            return Err(anyhow!(
                "{} has {} labels but output shape {:?}",
                artifact.tag(),
                labels.len(),
                artifact.meta.output.shape
            ));
        }

        tracing::debug!(
            "{}x{} input, {:?} preprocessing, {} classes",
            width,
            height,
            preprocessor.mode(),
            labels.len()
        );

        let mut classifier = Self::new(
            preprocessor,
            Arc::new(runner),
            labels,
            top_k,
            max_concurrent,
        );
        classifier.meta = Some(artifact.meta);
        Ok(classifier)
    }

    /// Metadata of the served artifact, when loaded from a store
    pub fn meta(&self) -> Option<&ArtifactMeta> {
        self.meta.as_ref()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Classify one encoded image on the current thread
    pub fn classify(&self, image: &[u8]) -> Result<Vec<Prediction>, PredictError> {
        let tensor = self.preprocessor.prepare(image)?;
        let scores = self.runner.run(tensor)?;
        self.labels.top_k(&scores, self.top_k)
    }

    /// Classify on the blocking pool, bounded by the concurrency limit.
    ///
    /// The permit travels with the blocking job, so a dropped request keeps
    /// its slot until the graph call returns.
    pub async fn predict(self: Arc<Self>, image: Vec<u8>) -> Result<Vec<Prediction>, PredictError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| PredictError::Unavailable)?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            self.classify(&image)
        })
        .await
        .map_err(|e| PredictError::Inference(format!("worker task failed: {}", e)))?
    }

    /// Stop admitting new predictions
    pub fn close(&self) {
        self.permits.close();
    }
}

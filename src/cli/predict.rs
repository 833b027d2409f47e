//! Local prediction command

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::open_store;
use crate::config::AppConfig;
use crate::engine::Classifier;
use crate::store::ModelTag;

/// Classify one image file and print the predictions as JSON
pub async fn predict(
    config: AppConfig,
    image: PathBuf,
    model: Option<String>,
    top_k: Option<usize>,
) -> Result<()> {
    let tag: ModelTag = model.unwrap_or(config.predict.model.clone()).parse()?;
    let top_k = top_k.unwrap_or(config.predict.top_k);
    let store = open_store(&config);

    let bytes = tokio::fs::read(&image)
        .await
        .with_context(|| format!("reading {}", image.display()))?;

    let classifier = tokio::task::spawn_blocking(move || Classifier::from_store(&store, &tag, top_k, 1))
        .await??;

    let predictions = Arc::new(classifier).predict(bytes).await?;
    println!("{}", serde_json::to_string_pretty(&predictions)?);
    Ok(())
}

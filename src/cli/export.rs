//! Export command

use anyhow::{Context, Result};

use super::{open_store, PreprocessArg};
use crate::config::AppConfig;
use crate::exporter::{export_model, image_input, ExportOptions};

/// Import a graph into the store and move `latest` to it
#[allow(clippy::too_many_arguments)]
pub async fn export(
    config: AppConfig,
    graph: String,
    labels: String,
    name: String,
    version: Option<String>,
    size: usize,
    preprocess: PreprocessArg,
) -> Result<()> {
    let opts = ExportOptions {
        name,
        version,
        graph: graph.parse()?,
        labels: labels.parse()?,
        input: image_input(size, size),
        preprocess: preprocess.into(),
    };
    let store = open_store(&config);

    println!("Exporting {} into {}", opts.graph, store.root().display());

    let artifact = tokio::task::spawn_blocking(move || export_model(&store, &opts))
        .await
        .context("export task failed")??;

    println!("Saved model: {}", artifact.tag());
    println!("  Path: {}", artifact.dir.display());
    Ok(())
}

//! HTTP server command

use std::sync::Arc;

use anyhow::Result;

use super::open_store;
use crate::config::AppConfig;
use crate::engine::Classifier;
use crate::server;
use crate::store::ModelTag;

/// Start the inference server
pub async fn serve(
    mut config: AppConfig,
    model: Option<String>,
    port: Option<u16>,
    host: Option<String>,
    top_k: Option<usize>,
) -> Result<()> {
    if let Some(model) = model {
        config.predict.model = model;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(top_k) = top_k {
        config.predict.top_k = top_k;
    }

    let tag: ModelTag = config.predict.model.parse()?;
    let store = open_store(&config);
    let top_k = config.predict.top_k;
    let max_concurrent = config.server.max_concurrent_predictions;

    // Graph loading is CPU-bound; keep it off the reactor
    let classifier = tokio::task::spawn_blocking(move || {
        Classifier::from_store(&store, &tag, top_k, max_concurrent)
    })
    .await??;
    tracing::info!("Model loaded successfully");

    let addr = config.server.addr();
    tracing::info!("Starting server at http://{}", addr);

    server::start(Arc::new(classifier), config.server).await?;

    Ok(())
}

//! Model info command

use anyhow::Result;

use super::open_store;
use crate::config::AppConfig;
use crate::store::format_shape;
use crate::vision::LabelTable;

/// Show artifact metadata
pub async fn info(config: AppConfig, model: String) -> Result<()> {
    let store = open_store(&config);
    let artifact = store.get(&model)?;
    let meta = &artifact.meta;

    println!("Model: {}\n", artifact.tag());
    println!("Path: {}", artifact.dir.display());
    println!("Source: {}", meta.source);
    println!("Created: {}", meta.created_at.to_rfc3339());

    let size_mb = meta.size_bytes as f64 / (1024.0 * 1024.0);
    println!("Graph size: {:.2} MB", size_mb);

    println!("\nSignature:");
    println!(
        "  Input:  {} {} {}",
        meta.input.name,
        meta.input.dtype,
        format_shape(&meta.input.shape)
    );
    println!(
        "  Output: {} {} {}",
        meta.output.name,
        meta.output.dtype,
        format_shape(&meta.output.shape)
    );
    println!("  Preprocess: {:?}", meta.preprocess);
    for (entry, options) in &meta.signatures {
        println!("  Entry point '{}': batchable={}", entry, options.batchable);
    }

    if let Ok(labels) = LabelTable::from_file(artifact.labels_path()) {
        println!("\nClasses: {}", labels.len());
    }

    Ok(())
}

//! List models command

use anyhow::Result;

use super::open_store;
use crate::config::AppConfig;

/// List models in the store
pub async fn list(config: AppConfig, verbose: bool) -> Result<()> {
    let store = open_store(&config);

    if !store.root().exists() {
        println!("No model store found at: {}", store.root().display());
        println!("\nSet RESNET_SERVE_STORE or run 'resnet-serve export' first.");
        return Ok(());
    }

    println!("Models in {}:\n", store.root().display());

    let models = store.list()?;
    if models.is_empty() {
        println!("  No models found.");
        println!("\nTo add models:");
        println!("  - Convert a network to ONNX");
        println!("  - Run 'resnet-serve export --graph <file.onnx> --labels <labels.json>'");
        return Ok(());
    }

    for model in &models {
        let latest = model.latest.as_deref().unwrap_or("-");
        println!(
            "  {} (latest: {}, {} version{})",
            model.name,
            latest,
            model.versions.len(),
            if model.versions.len() == 1 { "" } else { "s" }
        );

        if verbose {
            for version in model.versions.iter().rev() {
                let tag = format!("{}:{}", model.name, version);
                match store.get(&tag) {
                    Ok(artifact) => println!(
                        "    {}  {}  {:.2} MB",
                        version,
                        artifact.meta.created_at.format("%Y-%m-%d %H:%M:%S"),
                        artifact.meta.size_bytes as f64 / (1024.0 * 1024.0)
                    ),
                    Err(e) => println!("    {}  (unreadable: {})", version, e),
                }
            }
            println!();
        }
    }

    Ok(())
}

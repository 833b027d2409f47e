use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resnet_serve::cli::{load_config, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resnet_serve=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.store)?;

    match cli.command {
        Commands::Export {
            graph,
            labels,
            name,
            version,
            size,
            preprocess,
        } => {
            resnet_serve::cli::export(config, graph, labels, name, version, size, preprocess)
                .await?;
        }
        Commands::Serve {
            model,
            port,
            host,
            top_k,
        } => {
            resnet_serve::cli::serve(config, model, port, host, top_k).await?;
        }
        Commands::Predict {
            image,
            model,
            top_k,
        } => {
            resnet_serve::cli::predict(config, image, model, top_k).await?;
        }
        Commands::List { verbose } => {
            resnet_serve::cli::list(config, verbose).await?;
        }
        Commands::Info { model } => {
            resnet_serve::cli::info(config, model).await?;
        }
    }

    Ok(())
}

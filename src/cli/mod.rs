//! CLI commands

mod export;
mod info;
mod list;
mod predict;
mod serve;

pub use export::export;
pub use info::info;
pub use list::list;
pub use predict::predict;
pub use serve::serve;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::store::ModelStore;
use crate::vision::PreprocessMode;

/// resnet-serve - ResNet50 image classification over HTTP
#[derive(Parser)]
#[command(name = "resnet-serve")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Model store directory (overrides config and RESNET_SERVE_STORE)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a converted ONNX graph into the model store
    Export {
        /// ONNX graph: file, directory, or hf://<owner>/<repo>/<file>
        #[arg(long, default_value = "./resnet50.onnx")]
        graph: String,

        /// Label table in imagenet_class_index.json format (path or hf:// URI)
        #[arg(long, default_value = "./imagenet_class_index.json")]
        labels: String,

        /// Name to register the model under
        #[arg(long, default_value = "onnx_resnet50")]
        name: String,

        /// Explicit version (default: generated from the current time)
        #[arg(long)]
        version: Option<String>,

        /// Input height and width in pixels
        #[arg(long, default_value = "224")]
        size: usize,

        /// Channel normalization the graph expects
        #[arg(long, value_enum, default_value = "caffe")]
        preprocess: PreprocessArg,
    },

    /// Start inference server
    Serve {
        /// Model tag, name[:version]
        #[arg(long, short)]
        model: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Number of classes returned per image
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Classify a local image file
    Predict {
        /// Image file
        image: PathBuf,

        /// Model tag, name[:version]
        #[arg(long, short)]
        model: Option<String>,

        /// Number of classes returned
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// List models in the store
    List {
        /// Show every version
        #[arg(long, short)]
        verbose: bool,
    },

    /// Show artifact metadata
    Info {
        /// Model tag, name[:version]
        model: String,
    },
}

/// CLI spelling of [`PreprocessMode`]
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PreprocessArg {
    Caffe,
    Tf,
    Torch,
}

impl From<PreprocessArg> for PreprocessMode {
    fn from(arg: PreprocessArg) -> Self {
        match arg {
            PreprocessArg::Caffe => PreprocessMode::Caffe,
            PreprocessArg::Tf => PreprocessMode::Tf,
            PreprocessArg::Torch => PreprocessMode::Torch,
        }
    }
}

/// Load the config file and apply the global `--store` override
pub fn load_config(config: Option<&Path>, store: Option<PathBuf>) -> Result<AppConfig> {
    let mut app = AppConfig::load(config)?;
    if let Some(path) = store {
        app.store.path = path;
    }
    Ok(app)
}

fn open_store(config: &AppConfig) -> ModelStore {
    ModelStore::new(config.store.path.clone())
}

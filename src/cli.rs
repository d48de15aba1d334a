use crate::config::{AppConfig, ModelType};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "breed-finder", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./breed-finder.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the ONNX model and its config.json
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,

    /// base, large or mobilenet
    #[arg(long, global = true)]
    pub model_type: Option<ModelType>,

    /// Number of labels to show
    #[arg(long, global = true)]
    pub top_k: Option<usize>,

    /// Skip GPU execution providers
    #[arg(long, global = true)]
    pub cpu: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Step through the card interactively (default)
    Interactive,
    /// Load the model, identify one image and print the results
    Identify {
        image: PathBuf,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.model_dir {
            config.model.dir = dir.clone();
        }
        if let Some(model_type) = self.model_type {
            config.model.model_type = model_type;
        }
        if let Some(top_k) = self.top_k {
            config.model.top_k = top_k;
        }
        if self.cpu {
            config.model.use_gpu = false;
        }
    }
}

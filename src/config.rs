use crate::error::{AppError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "breed-finder.toml";

/// Parsed the same way from TOML and the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ModelType {
    Base,
    Large,
    MobileNetV3Large,
}

impl ModelType {
    /// (model file, label config file) inside the model directory.
    pub fn file_names(&self) -> (&'static str, &'static str) {
        match self {
            ModelType::Base => (
                "convnextv2-base-22k-384.onnx",
                "convnextv2-base-22k-384-config.json",
            ),
            ModelType::Large => (
                "convnextv2-large-22k-384.onnx",
                "convnextv2-large-22k-384-config.json",
            ),
            ModelType::MobileNetV3Large => ("mobilenetv3_large.onnx", "mobilenetv3_config.json"),
        }
    }

    pub fn crop_size(&self) -> u32 {
        match self {
            ModelType::Base | ModelType::Large => 384,
            ModelType::MobileNetV3Large => 224,
        }
    }
}

impl std::str::FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(ModelType::Base),
            "large" => Ok(ModelType::Large),
            "mobilenetv3large" | "mobilenet" => Ok(ModelType::MobileNetV3Large),
            other => Err(format!("unknown model type '{}'", other)),
        }
    }
}

impl TryFrom<String> for ModelType {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub dir: PathBuf,
    pub model_type: ModelType,
    pub use_gpu: bool,
    pub intra_threads: usize,
    pub top_k: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("models"),
            model_type: ModelType::MobileNetV3Large,
            use_gpu: true,
            intra_threads: 4,
            top_k: 3,
        }
    }
}

impl ModelConfig {
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(self.model_type.file_names().0)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.dir.join(self.model_type.file_names().1)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "Find your dog's Breed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` if given, else `breed-finder.toml` when it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.top_k == 0 {
            return Err(AppError::Config("model.top_k must be at least 1".into()));
        }
        if self.model.intra_threads == 0 {
            return Err(AppError::Config("model.intra_threads must be at least 1".into()));
        }
        Ok(())
    }
}

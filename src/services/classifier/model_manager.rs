use crate::config::ModelConfig;
use crate::error::{AppError, Result};
use crate::models::classify_types::Prediction;
use crate::models::image_types::UploadedImage;
use crate::services::classifier::inference;
use crate::services::classifier::provider::{ModelHandle, ModelProvider};
use async_trait::async_trait;
use ort::session::Session;
use std::sync::{Arc, Mutex};

/// Loads an ONNX image classifier and its `id2label` map from the model directory.
#[derive(Debug, Clone)]
pub struct OnnxModelProvider {
    config: ModelConfig,
}

impl OnnxModelProvider {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn files_present(&self) -> bool {
        self.config.model_path().exists() && self.config.labels_path().exists()
    }

    async fn load_labels(&self) -> Result<Vec<String>> {
        let labels_path = self.config.labels_path();
        let content = tokio::fs::read_to_string(&labels_path).await.map_err(|e| {
            AppError::Model(format!(
                "Failed to read config file {}: {}",
                labels_path.display(),
                e
            ))
        })?;
        parse_labels(&content)
    }

    async fn load_session(&self) -> Result<Session> {
        let model_path = self.config.model_path();
        let use_gpu = self.config.use_gpu;
        let intra_threads = self.config.intra_threads;

        tokio::task::spawn_blocking(move || -> Result<Session> {
            let _ = ort::init().with_name("breed-finder").commit();

            let mut builder = Session::builder()
                .map_err(|e| AppError::Model(format!("Failed to create session builder: {}", e)))?
                .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
                .map_err(|e| AppError::Model(format!("Failed to set optimization level: {}", e)))?
                .with_intra_threads(intra_threads)
                .map_err(|e| AppError::Model(format!("Failed to set intra threads: {}", e)))?;

            if use_gpu {
                builder = builder
                    .with_execution_providers([
                        ort::execution_providers::CUDAExecutionProvider::default().build(),
                        ort::execution_providers::CoreMLExecutionProvider::default().build(),
                        ort::execution_providers::CPUExecutionProvider::default().build(),
                    ])
                    .map_err(|e| {
                        AppError::Model(format!("Failed to register GPU execution providers: {}", e))
                    })?;
            } else {
                builder = builder
                    .with_execution_providers([
                        ort::execution_providers::CPUExecutionProvider::default().build(),
                    ])
                    .map_err(|e| {
                        AppError::Model(format!("Failed to register CPU execution provider: {}", e))
                    })?;
            }

            builder
                .commit_from_file(&model_path)
                .map_err(|e| AppError::Model(format!("Failed to load ONNX model: {}", e)))
        })
        .await
        .map_err(|e| AppError::Model(format!("Failed to spawn model loading task: {}", e)))?
    }
}

#[async_trait]
impl ModelProvider for OnnxModelProvider {
    async fn load(&self) -> Result<Arc<dyn ModelHandle>> {
        if !self.files_present() {
            return Err(AppError::Model(format!(
                "Model files not found in {} (expected {} and {})",
                self.config.dir.display(),
                self.config.model_path().display(),
                self.config.labels_path().display()
            )));
        }

        tracing::info!(
            model_type = ?self.config.model_type,
            path = %self.config.model_path().display(),
            use_gpu = self.config.use_gpu,
            "loading ONNX model"
        );

        let labels = self.load_labels().await?;
        let session = self.load_session().await?;

        tracing::info!(labels = labels.len(), "ONNX model ready");

        Ok(Arc::new(OnnxModel {
            session: Arc::new(Mutex::new(session)),
            labels: labels.into(),
            crop_size: self.config.model_type.crop_size(),
            top_k: self.config.top_k,
        }))
    }
}

pub struct OnnxModel {
    session: Arc<Mutex<Session>>,
    labels: Arc<[String]>,
    crop_size: u32,
    top_k: usize,
}

#[async_trait]
impl ModelHandle for OnnxModel {
    async fn classify(&self, image: &UploadedImage) -> Result<Vec<Prediction>> {
        let session = self.session.clone();
        let labels = self.labels.clone();
        let bytes = image.bytes.clone();
        let (crop_size, top_k) = (self.crop_size, self.top_k);

        // Preprocessing and inference are CPU bound.
        tokio::task::spawn_blocking(move || -> Result<Vec<Prediction>> {
            let img = inference::decode_image(&bytes)?;
            let tensor = inference::preprocess_image(&img, crop_size)?;
            let mut guard = session
                .lock()
                .map_err(|_| AppError::Model("Model session lock poisoned".into()))?;
            inference::run_inference(&mut guard, tensor, &labels, top_k)
        })
        .await
        .map_err(|e| AppError::Model(format!("Classification task join failed: {}", e)))?
    }
}

/// Labels ordered by index from a Hugging Face style `config.json`.
pub fn parse_labels(config_content: &str) -> Result<Vec<String>> {
    let config: serde_json::Value = serde_json::from_str(config_content)
        .map_err(|e| AppError::Model(format!("Failed to parse config JSON: {}", e)))?;

    let id2label = config["id2label"]
        .as_object()
        .ok_or_else(|| AppError::Model("Config missing id2label field".into()))?;

    let mut labels = id2label
        .iter()
        .map(|(k, v)| {
            let idx = k
                .parse::<usize>()
                .map_err(|_| AppError::Model(format!("Invalid label index '{}'", k)))?;
            let label = v.as_str().unwrap_or("unknown").to_string();
            Ok((idx, label))
        })
        .collect::<Result<Vec<(usize, String)>>>()?;
    labels.sort_by_key(|(idx, _)| *idx);

    Ok(labels.into_iter().map(|(_, label)| label).collect())
}

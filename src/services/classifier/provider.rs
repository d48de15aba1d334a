use crate::error::Result;
use crate::models::classify_types::Prediction;
use crate::models::image_types::UploadedImage;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of a ready-to-use classifier. Loading may be slow and may fail.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn ModelHandle>>;
}

/// A loaded classifier.
#[async_trait]
pub trait ModelHandle: Send + Sync {
    /// Ordered best-first.
    async fn classify(&self, image: &UploadedImage) -> Result<Vec<Prediction>>;
}

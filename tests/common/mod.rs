#![allow(dead_code)]

use async_trait::async_trait;
use breed_finder_lib::error::{AppError, Result};
use breed_finder_lib::models::classify_types::Prediction;
use breed_finder_lib::models::image_types::UploadedImage;
use breed_finder_lib::services::classifier::provider::{ModelHandle, ModelProvider};
use image::{ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

pub fn breed_predictions() -> Vec<Prediction> {
    vec![
        Prediction::new("beagle", 0.87),
        Prediction::new("basset", 0.10),
    ]
}

/// In-memory provider; the first `load_failures` loads and `classify_failures`
/// classifications are rejected.
pub struct FakeProvider {
    predictions: Vec<Prediction>,
    load_failures: AtomicUsize,
    classify_failures: Arc<AtomicUsize>,
    pub loads: AtomicUsize,
}

impl FakeProvider {
    pub fn new(predictions: Vec<Prediction>) -> Self {
        Self {
            predictions,
            load_failures: AtomicUsize::new(0),
            classify_failures: Arc::new(AtomicUsize::new(0)),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn failing_loads(self, count: usize) -> Self {
        self.load_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn failing_classifications(self, count: usize) -> Self {
        self.classify_failures.store(count, Ordering::SeqCst);
        self
    }
}

fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl ModelProvider for FakeProvider {
    async fn load(&self) -> Result<Arc<dyn ModelHandle>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.load_failures) {
            return Err(AppError::Model("weights unavailable".into()));
        }
        Ok(Arc::new(FakeModel {
            predictions: self.predictions.clone(),
            classify_failures: self.classify_failures.clone(),
        }))
    }
}

struct FakeModel {
    predictions: Vec<Prediction>,
    classify_failures: Arc<AtomicUsize>,
}

#[async_trait]
impl ModelHandle for FakeModel {
    async fn classify(&self, _image: &UploadedImage) -> Result<Vec<Prediction>> {
        if take_failure(&self.classify_failures) {
            return Err(AppError::Model("inference crashed".into()));
        }
        Ok(self.predictions.clone())
    }
}

/// Holds `load` open until the paired sender fires.
pub struct GatedProvider {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl GatedProvider {
    pub fn new() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Self {
                gate: Mutex::new(Some(rx)),
            },
        )
    }
}

#[async_trait]
impl ModelProvider for GatedProvider {
    async fn load(&self) -> Result<Arc<dyn ModelHandle>> {
        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(Arc::new(FakeModel {
            predictions: breed_predictions(),
            classify_failures: Arc::new(AtomicUsize::new(0)),
        }))
    }
}

pub fn write_png(dir: &Path, name: &str) -> PathBuf {
    let img = ImageBuffer::from_pixel(32, 24, Rgb([200u8, 150, 90]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes.into_inner()).unwrap();
    path
}

/// Loads instantly; classification never completes.
pub struct StalledProvider;

struct StalledModel;

#[async_trait]
impl ModelProvider for StalledProvider {
    async fn load(&self) -> Result<Arc<dyn ModelHandle>> {
        Ok(Arc::new(StalledModel))
    }
}

#[async_trait]
impl ModelHandle for StalledModel {
    async fn classify(&self, _image: &UploadedImage) -> Result<Vec<Prediction>> {
        std::future::pending().await
    }
}

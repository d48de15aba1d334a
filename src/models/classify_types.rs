use crate::models::image_types::ImagePreview;
use crate::models::workflow_types::{ActionDescriptor, StateMetadata, WorkflowState};
use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Prediction {
    pub class_name: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(class_name: impl Into<String>, probability: f32) -> Self {
        Self {
            class_name: class_name.into(),
            probability,
        }
    }
}

/// Everything the presentation layer needs to draw the card.
#[derive(Debug, Serialize, Clone)]
pub struct WorkflowSnapshot {
    pub state: WorkflowState,
    #[serde(flatten)]
    pub metadata: StateMetadata,
    pub action: ActionDescriptor,
    pub image: Option<ImagePreview>,
    pub results: Vec<Prediction>,
    pub error: Option<String>,
    pub model_loaded: bool,
}

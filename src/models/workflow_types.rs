use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the identify workflow. Exactly one is current at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    LoadingModel,
    ModelReady,
    ImageReady,
    Identifying,
    Complete,
    /// An async step was rejected; carries the stage that failed.
    Failed(FailedStage),
}

/// Transitional stage a failure was observed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    LoadingModel,
    Identifying,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEvent {
    Advance,
    Fail,
    Retry,
}

/// Display flags consulted by the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StateMetadata {
    pub show_image: bool,
    pub show_results: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    LoadModel,
    Upload,
    Identify,
    Reset,
    Retry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    ArrowForward,
    Loop,
    Publish,
    Refresh,
}

/// What the primary button shows and does in a given state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub action: Option<ActionKind>,
    pub label: &'static str,
    pub icon: Icon,
}

impl ActionDescriptor {
    pub fn is_actionable(&self) -> bool {
        self.action.is_some()
    }
}

impl fmt::Display for FailedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedStage::LoadingModel => write!(f, "loading_model"),
            FailedStage::Identifying => write!(f, "identifying"),
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Idle => write!(f, "idle"),
            WorkflowState::LoadingModel => write!(f, "loading_model"),
            WorkflowState::ModelReady => write!(f, "model_ready"),
            WorkflowState::ImageReady => write!(f, "image_ready"),
            WorkflowState::Identifying => write!(f, "identifying"),
            WorkflowState::Complete => write!(f, "complete"),
            WorkflowState::Failed(stage) => write!(f, "failed ({})", stage),
        }
    }
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowEvent::Advance => write!(f, "advance"),
            WorkflowEvent::Fail => write!(f, "fail"),
            WorkflowEvent::Retry => write!(f, "retry"),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::LoadModel => write!(f, "load model"),
            ActionKind::Upload => write!(f, "upload"),
            ActionKind::Identify => write!(f, "identify"),
            ActionKind::Reset => write!(f, "reset"),
            ActionKind::Retry => write!(f, "retry"),
        }
    }
}

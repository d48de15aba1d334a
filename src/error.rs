use crate::models::workflow_types::{ActionKind, WorkflowEvent, WorkflowState};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Not a usable image: {0}")]
    InvalidImage(String),

    #[error("Event {event} is not accepted in state {state}")]
    InvalidTransition {
        state: WorkflowState,
        event: WorkflowEvent,
    },

    #[error("{action} is not available while {state}")]
    ActionUnavailable {
        action: ActionKind,
        state: WorkflowState,
    },

    #[error("Another operation is still in progress")]
    Busy,

    #[error("Operation was cancelled before it finished")]
    Cancelled,

    #[error("{0}")]
    Message(String),
}

// Forwarded to a UI bridge the same way regardless of variant.
impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("AppError", 1)?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Message(format!("JSON error: {}", err))
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Message(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Message(msg.to_string())
    }
}

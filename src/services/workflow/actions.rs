use crate::models::workflow_types::{ActionDescriptor, ActionKind, FailedStage, Icon, WorkflowState};

/// Primary button for `state`. Transitional states carry no action.
pub fn action_for(state: WorkflowState) -> ActionDescriptor {
    match state {
        WorkflowState::Idle => ActionDescriptor {
            action: Some(ActionKind::LoadModel),
            label: "Load Model",
            icon: Icon::ArrowForward,
        },
        WorkflowState::LoadingModel => ActionDescriptor {
            action: None,
            label: "Loading Model...",
            icon: Icon::Loop,
        },
        WorkflowState::ModelReady => ActionDescriptor {
            action: Some(ActionKind::Upload),
            label: "Upload Image",
            icon: Icon::Publish,
        },
        WorkflowState::ImageReady => ActionDescriptor {
            action: Some(ActionKind::Identify),
            label: "Identify Breed",
            icon: Icon::ArrowForward,
        },
        WorkflowState::Identifying => ActionDescriptor {
            action: None,
            label: "Identifying...",
            icon: Icon::Loop,
        },
        WorkflowState::Complete => ActionDescriptor {
            action: Some(ActionKind::Reset),
            label: "Reset",
            icon: Icon::ArrowForward,
        },
        WorkflowState::Failed(FailedStage::LoadingModel) => ActionDescriptor {
            action: Some(ActionKind::Retry),
            label: "Retry Loading Model",
            icon: Icon::Refresh,
        },
        WorkflowState::Failed(FailedStage::Identifying) => ActionDescriptor {
            action: Some(ActionKind::Retry),
            label: "Try Again",
            icon: Icon::Refresh,
        },
    }
}

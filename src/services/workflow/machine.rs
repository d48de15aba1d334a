use crate::error::{AppError, Result};
use crate::models::workflow_types::{FailedStage, StateMetadata, WorkflowEvent, WorkflowState};

/// Computes the next state for `event`. Pairs the table does not list are
/// reported as `InvalidTransition` instead of falling back to `Idle`.
pub fn transition(state: WorkflowState, event: WorkflowEvent) -> Result<WorkflowState> {
    use WorkflowEvent::*;
    use WorkflowState::*;

    let next = match (state, event) {
        (Idle, Advance) => LoadingModel,
        (LoadingModel, Advance) => ModelReady,
        (ModelReady, Advance) => ImageReady,
        (ImageReady, Advance) => Identifying,
        (Identifying, Advance) => Complete,
        (Complete, Advance) => ModelReady,

        (LoadingModel, Fail) => Failed(FailedStage::LoadingModel),
        (Identifying, Fail) => Failed(FailedStage::Identifying),

        (Failed(FailedStage::LoadingModel), Retry) => Idle,
        (Failed(FailedStage::Identifying), Retry) => ImageReady,

        (state, event) => return Err(AppError::InvalidTransition { state, event }),
    };

    Ok(next)
}

pub fn metadata(state: WorkflowState) -> StateMetadata {
    match state {
        WorkflowState::ImageReady | WorkflowState::Failed(FailedStage::Identifying) => StateMetadata {
            show_image: true,
            show_results: false,
        },
        WorkflowState::Complete => StateMetadata {
            show_image: true,
            show_results: true,
        },
        _ => StateMetadata::default(),
    }
}

/// Holds the current state and applies events to it.
#[derive(Debug, Clone)]
pub struct WorkflowController {
    state: WorkflowState,
}

impl Default for WorkflowController {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowController {
    pub const INITIAL: WorkflowState = WorkflowState::Idle;

    pub fn new() -> Self {
        Self {
            state: Self::INITIAL,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn metadata(&self) -> StateMetadata {
        metadata(self.state)
    }

    /// Applies `event`. On error the current state is left untouched.
    pub fn dispatch(&mut self, event: WorkflowEvent) -> Result<WorkflowState> {
        let next = transition(self.state, event)?;
        tracing::debug!(from = %self.state, to = %next, event = %event, "workflow transition");
        self.state = next;
        Ok(next)
    }

    pub fn advance(&mut self) -> Result<WorkflowState> {
        self.dispatch(WorkflowEvent::Advance)
    }
}

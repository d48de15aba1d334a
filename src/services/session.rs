use crate::error::{AppError, Result};
use crate::models::classify_types::{Prediction, WorkflowSnapshot};
use crate::models::image_types::UploadedImage;
use crate::models::workflow_types::{ActionKind, FailedStage, WorkflowEvent, WorkflowState};
use crate::services::classifier::provider::{ModelHandle, ModelProvider};
use crate::services::upload_service::{self, FileSelection};
use crate::services::workflow::actions::action_for;
use crate::services::workflow::machine::WorkflowController;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, MutexGuard};

/// What pressing the primary button did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Completed,
    /// The presentation layer should open its file picker and call `upload`.
    FilePickerRequested,
}

/// Owns the workflow state and everything produced along the way.
///
/// Every transition is followed by a published [`WorkflowSnapshot`], so
/// observers see transitional states while a load or identify is pending.
pub struct WorkflowSession {
    controller: WorkflowController,
    provider: Arc<dyn ModelProvider>,
    model: Option<Arc<dyn ModelHandle>>,
    image: Option<UploadedImage>,
    results: Vec<Prediction>,
    error: Option<String>,
    updates: watch::Sender<WorkflowSnapshot>,
}

impl WorkflowSession {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        let controller = WorkflowController::new();
        let state = controller.state();
        let (updates, _) = watch::channel(WorkflowSnapshot {
            state,
            metadata: controller.metadata(),
            action: action_for(state),
            image: None,
            results: Vec::new(),
            error: None,
            model_loaded: false,
        });

        Self {
            controller,
            provider,
            model: None,
            image: None,
            results: Vec::new(),
            error: None,
            updates,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.controller.state()
    }

    pub fn results(&self) -> &[Prediction] {
        &self.results
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.controller.state();
        WorkflowSnapshot {
            state,
            metadata: self.controller.metadata(),
            action: action_for(state),
            image: self.image.as_ref().map(UploadedImage::preview),
            results: self.results.clone(),
            error: self.error.clone(),
            model_loaded: self.model.is_some(),
        }
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }

    fn require(&self, action: ActionKind) -> Result<()> {
        let state = self.controller.state();
        if action_for(state).action == Some(action) {
            Ok(())
        } else {
            Err(AppError::ActionUnavailable { action, state })
        }
    }

    fn advance(&mut self) -> Result<()> {
        self.controller.advance()?;
        self.publish();
        Ok(())
    }

    /// Moves a transitional state to `Failed` and records the message.
    fn fail(&mut self, err: AppError) -> AppError {
        if let Err(e) = self.controller.dispatch(WorkflowEvent::Fail) {
            tracing::error!(error = %e, "failure reported outside a transitional state");
        }
        tracing::warn!(state = %self.controller.state(), error = %err, "workflow step failed");
        self.error = Some(err.to_string());
        self.publish();
        err
    }

    /// Idle → LoadingModel → ModelReady.
    pub async fn load_model(&mut self) -> Result<()> {
        self.require(ActionKind::LoadModel)?;
        self.advance()?;

        let provider = self.provider.clone();
        let mut step = InFlight::new(self);
        let outcome = provider.load().await;
        step.settled = true;

        match outcome {
            Ok(handle) => {
                step.session.model = Some(handle);
                tracing::info!("model loaded");
                step.session.advance()
            }
            Err(e) => Err(step.session.fail(e)),
        }
    }

    /// Accepts a picked file. Returns `false` if the selection was empty.
    pub fn upload(&mut self, selection: &FileSelection) -> Result<bool> {
        self.ensure_upload_allowed()?;
        match upload_service::read_selection(selection)? {
            Some(image) => {
                self.set_image(image)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// ModelReady → ImageReady; in ImageReady the image is replaced in place.
    pub fn set_image(&mut self, image: UploadedImage) -> Result<()> {
        self.ensure_upload_allowed()?;
        tracing::info!(file = %image.file_name, width = image.width, height = image.height, "image uploaded");
        self.image = Some(image);

        if self.controller.state() == WorkflowState::ModelReady {
            self.advance()
        } else {
            self.publish();
            Ok(())
        }
    }

    fn ensure_upload_allowed(&self) -> Result<()> {
        match self.controller.state() {
            WorkflowState::ModelReady | WorkflowState::ImageReady => Ok(()),
            state => Err(AppError::ActionUnavailable {
                action: ActionKind::Upload,
                state,
            }),
        }
    }

    /// ImageReady → Identifying → Complete.
    pub async fn identify(&mut self) -> Result<&[Prediction]> {
        self.require(ActionKind::Identify)?;
        let model = self
            .model
            .clone()
            .ok_or_else(|| AppError::Model("Model not loaded".into()))?;
        let image = self
            .image
            .clone()
            .ok_or_else(|| AppError::InvalidImage("No image uploaded".into()))?;

        self.advance()?;

        let mut step = InFlight::new(&mut *self);
        let outcome = model.classify(&image).await;
        step.settled = true;

        let settled = match outcome {
            Ok(predictions) => {
                tracing::info!(
                    file = %image.file_name,
                    top = predictions.first().map(|p| p.class_name.as_str()).unwrap_or("-"),
                    count = predictions.len(),
                    "image identified"
                );
                step.session.results = predictions;
                step.session.advance()
            }
            Err(e) => Err(step.session.fail(e)),
        };
        drop(step);

        settled?;
        Ok(&self.results)
    }

    /// Complete → ModelReady, dropping the previous results.
    pub fn reset(&mut self) -> Result<()> {
        self.require(ActionKind::Reset)?;
        self.results.clear();
        self.advance()
    }

    /// Failed → Idle or ImageReady depending on which step failed.
    pub fn retry(&mut self) -> Result<()> {
        self.require(ActionKind::Retry)?;
        if self.controller.state() == WorkflowState::Failed(FailedStage::LoadingModel) {
            self.model = None;
        }
        self.controller.dispatch(WorkflowEvent::Retry)?;
        self.error = None;
        tracing::info!(state = %self.controller.state(), "retrying");
        self.publish();
        Ok(())
    }

    pub async fn perform(&mut self, action: ActionKind) -> Result<ActionOutcome> {
        match action {
            ActionKind::LoadModel => self.load_model().await?,
            ActionKind::Upload => {
                self.ensure_upload_allowed()?;
                return Ok(ActionOutcome::FilePickerRequested);
            }
            ActionKind::Identify => {
                self.identify().await?;
            }
            ActionKind::Reset => self.reset()?,
            ActionKind::Retry => self.retry()?,
        }
        Ok(ActionOutcome::Completed)
    }

    /// Runs whatever the primary button offers in the current state.
    pub async fn press_primary(&mut self) -> Result<ActionOutcome> {
        match action_for(self.controller.state()).action {
            Some(action) => self.perform(action).await,
            // Only transitional states lack an action.
            None => Err(AppError::Busy),
        }
    }
}

/// Marks an awaited load or classify. Dropped before `settled` is set,
/// it moves the workflow out of its transitional state with
/// [`AppError::Cancelled`], so Retry stays reachable.
struct InFlight<'a> {
    session: &'a mut WorkflowSession,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(session: &'a mut WorkflowSession) -> Self {
        Self {
            session,
            settled: false,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.fail(AppError::Cancelled);
        }
    }
}

/// A session shared with a presentation layer.
///
/// Commands never queue: while one holds the session, others get
/// [`AppError::Busy`]. Snapshots stay readable without the lock.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<WorkflowSession>>,
    updates: watch::Receiver<WorkflowSnapshot>,
}

impl SharedSession {
    pub fn new(session: WorkflowSession) -> Self {
        let updates = session.subscribe();
        Self {
            inner: Arc::new(Mutex::new(session)),
            updates,
        }
    }

    pub fn try_session(&self) -> Result<MutexGuard<'_, WorkflowSession>> {
        self.inner.try_lock().map_err(|_| AppError::Busy)
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.updates.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.updates.clone()
    }
}

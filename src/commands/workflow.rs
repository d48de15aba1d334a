use crate::error::AppError;
use crate::models::classify_types::{Prediction, WorkflowSnapshot};
use crate::services::session::{ActionOutcome, SharedSession};
use crate::services::upload_service::FileSelection;

pub fn get_snapshot(session: &SharedSession) -> WorkflowSnapshot {
    session.snapshot()
}

/// The card's single button.
pub async fn press_action(session: &SharedSession) -> Result<ActionOutcome, AppError> {
    let mut guard = session.try_session()?;
    guard.press_primary().await
}

/// Called by the file picker once the user chose something.
pub fn select_file(session: &SharedSession, selection: FileSelection) -> Result<bool, AppError> {
    if selection.is_empty() {
        return Ok(false);
    }
    session.try_session()?.upload(&selection)
}

pub async fn load_model(session: &SharedSession) -> Result<(), AppError> {
    session.try_session()?.load_model().await
}

pub async fn identify(session: &SharedSession) -> Result<Vec<Prediction>, AppError> {
    let mut guard = session.try_session()?;
    Ok(guard.identify().await?.to_vec())
}

pub fn reset(session: &SharedSession) -> Result<(), AppError> {
    session.try_session()?.reset()
}

pub fn retry(session: &SharedSession) -> Result<(), AppError> {
    session.try_session()?.retry()
}

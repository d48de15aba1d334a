mod common;

use breed_finder_lib::commands::workflow;
use breed_finder_lib::error::AppError;
use breed_finder_lib::models::workflow_types::{ActionKind, FailedStage, WorkflowState};
use breed_finder_lib::services::session::{ActionOutcome, SharedSession, WorkflowSession};
use breed_finder_lib::services::upload_service::FileSelection;
use breed_finder_lib::ui::card::format_prediction;
use common::{breed_predictions, write_png, FakeProvider, GatedProvider, StalledProvider};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn session_with(provider: FakeProvider) -> WorkflowSession {
    WorkflowSession::new(Arc::new(provider))
}

async fn session_at_image_ready(provider: FakeProvider, dir: &tempfile::TempDir) -> WorkflowSession {
    let mut session = session_with(provider);
    session.load_model().await.unwrap();
    let path = write_png(dir.path(), "rex.png");
    assert!(session.upload(&FileSelection::single(path)).unwrap());
    session
}

#[tokio::test]
async fn load_model_reaches_model_ready() {
    let mut session = session_with(FakeProvider::new(breed_predictions()));
    assert_eq!(session.state(), WorkflowState::Idle);

    session.load_model().await.unwrap();

    assert_eq!(session.state(), WorkflowState::ModelReady);
    assert!(session.has_model());
    assert!(session.results().is_empty());
}

#[tokio::test]
async fn upload_moves_to_image_ready() {
    let dir = tempfile::tempdir().unwrap();
    let session = session_at_image_ready(FakeProvider::new(breed_predictions()), &dir).await;

    assert_eq!(session.state(), WorkflowState::ImageReady);
    let image = session.image().unwrap();
    assert!(!image.url.is_empty());
    assert_eq!(image.file_name, "rex.png");

    let snapshot = session.snapshot();
    assert!(snapshot.metadata.show_image);
    assert!(!snapshot.metadata.show_results);
}

#[tokio::test]
async fn identify_stores_results_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_at_image_ready(FakeProvider::new(breed_predictions()), &dir).await;

    let results = session.identify().await.unwrap().to_vec();

    assert_eq!(session.state(), WorkflowState::Complete);
    assert_eq!(results, breed_predictions());
    let rendered: Vec<_> = results.iter().map(format_prediction).collect();
    assert_eq!(rendered, vec!["beagle: %87.00", "basset: %10.00"]);
    assert!(session.snapshot().metadata.show_results);
}

#[tokio::test]
async fn reset_clears_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_at_image_ready(FakeProvider::new(breed_predictions()), &dir).await;
    session.identify().await.unwrap();

    session.reset().unwrap();

    assert_eq!(session.state(), WorkflowState::ModelReady);
    assert!(session.results().is_empty());
    assert!(session.has_model());
}

#[tokio::test]
async fn rejected_load_is_observable_as_failed() {
    let mut session = session_with(FakeProvider::new(breed_predictions()).failing_loads(1));
    let updates = session.subscribe();

    let err = session.load_model().await.unwrap_err();

    assert!(matches!(err, AppError::Model(_)));
    let failed = WorkflowState::Failed(FailedStage::LoadingModel);
    assert_eq!(session.state(), failed);
    assert_eq!(updates.borrow().state, failed);
    assert!(updates.borrow().error.as_deref().unwrap().contains("weights unavailable"));
    assert_eq!(updates.borrow().action.action, Some(ActionKind::Retry));

    session.retry().unwrap();
    assert_eq!(session.state(), WorkflowState::Idle);
    assert!(session.error().is_none());

    session.load_model().await.unwrap();
    assert_eq!(session.state(), WorkflowState::ModelReady);
}

#[tokio::test]
async fn rejected_identify_keeps_image_and_retries_to_image_ready() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FakeProvider::new(breed_predictions()).failing_classifications(1);
    let mut session = session_at_image_ready(provider, &dir).await;

    assert!(session.identify().await.is_err());
    assert_eq!(session.state(), WorkflowState::Failed(FailedStage::Identifying));
    assert!(session.snapshot().metadata.show_image);
    assert!(session.image().is_some());

    session.retry().unwrap();
    assert_eq!(session.state(), WorkflowState::ImageReady);

    session.identify().await.unwrap();
    assert_eq!(session.state(), WorkflowState::Complete);
}

#[tokio::test]
async fn primary_button_walks_the_full_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(FakeProvider::new(breed_predictions()));
    let mut session = WorkflowSession::new(provider.clone());

    assert_eq!(session.press_primary().await.unwrap(), ActionOutcome::Completed);
    assert_eq!(session.state(), WorkflowState::ModelReady);

    assert_eq!(
        session.press_primary().await.unwrap(),
        ActionOutcome::FilePickerRequested
    );
    assert_eq!(session.state(), WorkflowState::ModelReady);
    session
        .upload(&FileSelection::single(write_png(dir.path(), "a.png")))
        .unwrap();

    assert_eq!(session.press_primary().await.unwrap(), ActionOutcome::Completed);
    assert_eq!(session.state(), WorkflowState::Complete);

    assert_eq!(session.press_primary().await.unwrap(), ActionOutcome::Completed);
    assert_eq!(session.state(), WorkflowState::ModelReady);
    assert_eq!(provider.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn actions_outside_their_state_are_rejected() {
    let mut session = session_with(FakeProvider::new(breed_predictions()));

    let err = session.identify().await.unwrap_err();
    assert!(matches!(
        err,
        AppError::ActionUnavailable {
            action: ActionKind::Identify,
            state: WorkflowState::Idle
        }
    ));
    assert!(session.reset().is_err());
    assert!(session.retry().is_err());
    assert!(session.upload(&FileSelection::single("dog.png")).is_err());
    assert_eq!(session.state(), WorkflowState::Idle);
}

#[tokio::test]
async fn empty_or_bad_selection_leaves_state_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(FakeProvider::new(breed_predictions()));
    session.load_model().await.unwrap();

    assert!(!session.upload(&FileSelection::default()).unwrap());
    assert_eq!(session.state(), WorkflowState::ModelReady);

    let text = dir.path().join("notes.jpg");
    std::fs::write(&text, "not an image").unwrap();
    let err = session.upload(&FileSelection::single(text)).unwrap_err();
    assert!(matches!(err, AppError::InvalidImage(_)));
    assert_eq!(session.state(), WorkflowState::ModelReady);
    assert!(session.image().is_none());
}

#[tokio::test]
async fn second_upload_replaces_image_without_transition() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_at_image_ready(FakeProvider::new(breed_predictions()), &dir).await;

    let other = write_png(dir.path(), "fido.png");
    assert!(session.upload(&FileSelection::single(other)).unwrap());

    assert_eq!(session.state(), WorkflowState::ImageReady);
    assert_eq!(session.image().unwrap().file_name, "fido.png");
}

#[tokio::test]
async fn commands_reject_interleaving_while_load_is_pending() {
    let (release, provider) = GatedProvider::new();
    let shared = SharedSession::new(WorkflowSession::new(Arc::new(provider)));
    let mut updates = shared.subscribe();

    let pending = {
        let shared = shared.clone();
        tokio::spawn(async move { workflow::load_model(&shared).await })
    };

    updates
        .wait_for(|s| s.state == WorkflowState::LoadingModel)
        .await
        .unwrap();

    assert!(matches!(workflow::press_action(&shared).await, Err(AppError::Busy)));
    assert!(matches!(workflow::reset(&shared), Err(AppError::Busy)));
    let snapshot = workflow::get_snapshot(&shared);
    assert_eq!(snapshot.state, WorkflowState::LoadingModel);
    assert!(!snapshot.action.is_actionable());

    release.send(()).unwrap();
    pending.await.unwrap().unwrap();

    assert_eq!(workflow::get_snapshot(&shared).state, WorkflowState::ModelReady);
}

#[tokio::test]
async fn commands_drive_identify_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let shared = SharedSession::new(session_with(FakeProvider::new(breed_predictions())));

    workflow::load_model(&shared).await.unwrap();
    assert!(!workflow::select_file(&shared, FileSelection::default()).unwrap());
    assert!(workflow::select_file(&shared, FileSelection::single(write_png(dir.path(), "b.png"))).unwrap());

    let results = workflow::identify(&shared).await.unwrap();
    assert_eq!(results.len(), 2);

    let snapshot = workflow::get_snapshot(&shared);
    assert_eq!(snapshot.state, WorkflowState::Complete);
    assert_eq!(snapshot.results[0].class_name, "beagle");

    workflow::reset(&shared).unwrap();
    assert!(workflow::get_snapshot(&shared).results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn abandoned_load_leaves_a_retryable_failure() {
    let (_release, provider) = GatedProvider::new();
    let mut session = WorkflowSession::new(Arc::new(provider));

    let timed_out = tokio::time::timeout(Duration::from_secs(5), session.load_model()).await;
    assert!(timed_out.is_err());

    assert_eq!(session.state(), WorkflowState::Failed(FailedStage::LoadingModel));
    assert_eq!(session.error(), Some(AppError::Cancelled.to_string().as_str()));
    assert_eq!(session.snapshot().action.action, Some(ActionKind::Retry));

    session.retry().unwrap();
    assert_eq!(session.state(), WorkflowState::Idle);
}

#[tokio::test(start_paused = true)]
async fn abandoned_identify_keeps_image_and_allows_retry() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WorkflowSession::new(Arc::new(StalledProvider));
    session.load_model().await.unwrap();
    session
        .upload(&FileSelection::single(write_png(dir.path(), "rex.png")))
        .unwrap();

    let timed_out = tokio::time::timeout(Duration::from_secs(5), session.identify()).await;
    assert!(timed_out.is_err());

    assert_eq!(session.state(), WorkflowState::Failed(FailedStage::Identifying));
    assert!(session.image().is_some());
    assert!(session.results().is_empty());

    session.retry().unwrap();
    assert_eq!(session.state(), WorkflowState::ImageReady);
}

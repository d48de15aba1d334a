use crate::commands::workflow;
use crate::error::{AppError, Result};
use crate::models::classify_types::WorkflowSnapshot;
use crate::models::workflow_types::ActionKind;
use crate::services::session::{SharedSession, WorkflowSession};
use crate::services::upload_service::FileSelection;
use crate::ui::card::{format_prediction, render_card};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "enter: press the button | u <path>: upload an image | q: quit";

/// Redraws the card on every published snapshot while the user types.
pub async fn run_interactive(session: SharedSession, title: String) -> Result<()> {
    let mut updates = session.subscribe();
    let renderer = tokio::spawn(async move {
        let first = updates.borrow_and_update().clone();
        println!("{}", render_card(&title, &first));
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            println!("{}", render_card(&title, &snapshot));
        }
    });

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut awaiting_path = false;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();

        if awaiting_path {
            awaiting_path = false;
            if !input.is_empty() {
                upload(&session, input);
            }
            continue;
        }

        match input {
            "q" | "quit" => break,
            "h" | "help" => println!("{}", HELP),
            "" => {
                let snapshot = session.snapshot();
                match snapshot.action.action {
                    Some(ActionKind::Upload) => {
                        println!("Image path:");
                        awaiting_path = true;
                    }
                    Some(_) => {
                        let session = session.clone();
                        tokio::spawn(async move {
                            let result = workflow::press_action(&session).await.map(|_| ());
                            report(&session, result);
                        });
                    }
                    None => println!("{}", snapshot.action.label),
                }
            }
            other => match other.strip_prefix("u ") {
                Some(path) => upload(&session, path.trim()),
                None => println!("{}", HELP),
            },
        }
    }

    renderer.abort();
    Ok(())
}

fn upload(session: &SharedSession, path: &str) {
    let result = workflow::select_file(session, FileSelection::single(path)).map(|_| ());
    report(session, result);
}

fn report(session: &SharedSession, result: Result<()>) {
    if let Err(e) = result {
        if let Some(line) = error_line(&session.snapshot(), &e) {
            println!("{}", line);
        }
    }
}

/// Text to print for `err`, or `None` when the card already carries it.
fn error_line(snapshot: &WorkflowSnapshot, err: &AppError) -> Option<String> {
    if matches!(err, AppError::Busy) {
        return Some("Still working, please wait.".to_string());
    }
    let message = err.to_string();
    if snapshot.error.as_deref() == Some(message.as_str()) {
        return None;
    }
    Some(message)
}

/// Load, upload, identify. Prints one formatted line per prediction or the JSON snapshot.
pub async fn run_identify(mut session: WorkflowSession, image: &Path, json: bool) -> Result<()> {
    session.load_model().await?;
    if !session.upload(&FileSelection::single(image))? {
        return Err(AppError::InvalidImage(format!("{} was not selected", image.display())));
    }
    session.identify().await?;

    if json {
        let snapshot = session.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for prediction in session.results() {
            println!("{}", format_prediction(prediction));
        }
    }
    Ok(())
}

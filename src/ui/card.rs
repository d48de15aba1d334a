use crate::models::classify_types::{Prediction, WorkflowSnapshot};
use crate::models::workflow_types::{ActionDescriptor, Icon};
use std::fmt::Write;

/// `beagle: %87.00`
pub fn format_prediction(prediction: &Prediction) -> String {
    format!(
        "{}: %{:.2}",
        prediction.class_name,
        prediction.probability * 100.0
    )
}

fn icon_glyph(icon: Icon) -> &'static str {
    match icon {
        Icon::ArrowForward => "->",
        Icon::Loop => "...",
        Icon::Publish => "^",
        Icon::Refresh => "<>",
    }
}

/// Enabled buttons are bracketed, disabled ones parenthesized.
pub fn format_button(action: &ActionDescriptor) -> String {
    let glyph = icon_glyph(action.icon);
    if action.is_actionable() {
        format!("[ {} {} ]", action.label, glyph)
    } else {
        format!("( {} {} )", action.label, glyph)
    }
}

pub fn render_card(title: &str, snapshot: &WorkflowSnapshot) -> String {
    let mut out = String::new();
    let rule = "=".repeat(title.chars().count() + 4);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "  {}", title);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{}", format_button(&snapshot.action));

    if snapshot.metadata.show_results {
        for prediction in &snapshot.results {
            let _ = writeln!(out, "  * {}", format_prediction(prediction));
        }
    }

    if snapshot.metadata.show_image {
        if let Some(image) = &snapshot.image {
            let _ = writeln!(
                out,
                "  [image] {} ({}x{})",
                image.file_name, image.width, image.height
            );
        }
    }

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "  ! {}", error);
    }

    out
}

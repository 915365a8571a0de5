//! Pure rendering of [`WorkflowState`] for the terminal.
//!
//! Nothing here reads back from what was printed; every view is derived from
//! a state snapshot.

use std::fmt::Write;

use crate::workflow::{Stage, Status, StatusKind, WorkflowState, ZephyrStatus};

fn icon(kind: StatusKind) -> &'static str {
    match kind {
        StatusKind::Info => "⏳",
        StatusKind::Success => "✅",
        StatusKind::Error => "❌",
    }
}

fn status_line(label: &str, status: &Status) -> String {
    format!("{} {label}: {}", icon(status.kind), status.message)
}

fn zephyr_lines(status: &ZephyrStatus) -> Vec<String> {
    let mut lines = vec![format!(
        "{} Zephyr Scale: {}",
        icon(status.kind),
        status.message
    )];
    if !status.created_keys.is_empty() {
        lines.push("   Created test cases:".to_string());
        lines.extend(status.created_keys.iter().map(|key| format!("   → {key}")));
    }
    lines
}

/// One line per status field that is currently set
pub fn status_lines(state: &WorkflowState) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(status) = &state.load_status {
        lines.push(status_line("Load", status));
    }
    if let Some(status) = &state.zephyr_status {
        lines.extend(zephyr_lines(status));
    }
    if let Some(status) = &state.publish_status {
        lines.push(status_line("Publish", status));
    }
    lines
}

/// Numbered table of the test cases
pub fn render_test_cases(state: &WorkflowState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🧪 TEST CASES ({})", state.test_cases.len());
    let _ = writeln!(out, "─────────────────");
    let width = state
        .test_cases
        .iter()
        .map(|case| case.id.chars().count())
        .max()
        .unwrap_or(0);
    for (index, case) in state.test_cases.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<width$}  {}",
            index + 1,
            case.id,
            case.description,
            width = width
        );
    }
    out
}

/// Full view of the workflow state
pub fn render_state(state: &WorkflowState) -> String {
    let mut out = String::new();

    match &state.story {
        Some(story) => {
            let _ = writeln!(out, "📖 STORY {}", story.id);
            let _ = writeln!(out, "───────────────");
            let _ = writeln!(out, "Summary: {}", story.summary);
            if !story.description.trim().is_empty() {
                let _ = writeln!(out, "{}", story.description.trim());
            }
            let _ = writeln!(out);
        }
        None => {
            let _ = writeln!(out, "📭 No story loaded");
            let _ = writeln!(out);
        }
    }

    if state.stage == Stage::TestsGenerated {
        out.push_str(&render_test_cases(state));
        let _ = writeln!(out);
    }

    for line in status_lines(state) {
        let _ = writeln!(out, "{line}");
    }

    out
}

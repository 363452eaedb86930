//! CLI output formatting for pipeline runs.
//!
//! # Information-First Display
//!
//! Output is **document-centric, not file-centric**. The primary display for
//! every document is its slug — the artifact identity — with the source path
//! shown in parentheses as secondary context. This makes the output readable
//! as an artifact inventory while still letting users trace results back to
//! specific files.
//!
//! # Output Format
//!
//! ```text
//! generated hello-world (content/2024-01-02-hello-world.md)
//! skipped(unchanged) older-post (content/older-post.md)
//! skipped(error: missing required field: title) broken (content/broken.md)
//!
//! warning: content/locked: permission denied
//!
//! 1 generated, 1 unchanged, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::pipeline::{DocumentOutcome, DocumentStatus, RunSummary};
use crate::scan::ScanWarning;
use std::path::Path;

/// Format one document outcome as a single line.
fn outcome_line(outcome: &DocumentOutcome) -> String {
    let verdict = match &outcome.status {
        DocumentStatus::Generated => "generated".to_string(),
        DocumentStatus::SkippedUnchanged => "skipped(unchanged)".to_string(),
        DocumentStatus::Failed(reason) => format!("skipped(error: {reason})"),
    };
    format!("{} {} ({})", verdict, outcome.slug, outcome.path.display())
}

/// Format one scan warning as a single line.
fn warning_line(warning: &ScanWarning) -> String {
    match &warning.path {
        Some(path) => format!("warning: {}: {}", path.display(), warning.message),
        None => format!("warning: {}", warning.message),
    }
}

/// Format a full run report: one line per document, warnings, then totals.
pub fn format_run_report(summary: &RunSummary) -> Vec<String> {
    let mut lines: Vec<String> = summary.outcomes.iter().map(outcome_line).collect();

    if !summary.warnings.is_empty() {
        lines.push(String::new());
        lines.extend(summary.warnings.iter().map(warning_line));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} generated, {} unchanged, {} failed",
        summary.generated(),
        summary.skipped(),
        summary.failed()
    ));

    lines
}

/// Print a run report to stdout.
pub fn print_run_report(summary: &RunSummary) {
    for line in format_run_report(summary) {
        println!("{}", line);
    }
}

/// Format scan-only output: one line per discovered document.
pub fn format_scan_report(documents: &[std::path::PathBuf], warnings: &[ScanWarning]) -> Vec<String> {
    let mut lines: Vec<String> = documents
        .iter()
        .map(|p| format!("{} ({})", crate::naming::slug_for(p), p.display()))
        .collect();

    if !warnings.is_empty() {
        lines.push(String::new());
        lines.extend(warnings.iter().map(warning_line));
    }

    lines.push(String::new());
    lines.push(format!("{} documents", documents.len()));

    lines
}

/// Print scan output to stdout.
pub fn print_scan_report(documents: &[std::path::PathBuf], warnings: &[ScanWarning]) {
    for line in format_scan_report(documents, warnings) {
        println!("{}", line);
    }
}

/// Format check output: per-document validity without rendering.
pub fn format_check_line(path: &Path, slug: &str, error: Option<&str>) -> String {
    match error {
        None => format!("ok {} ({})", slug, path.display()),
        Some(reason) => format!("invalid({}) {} ({})", reason, slug, path.display()),
    }
}

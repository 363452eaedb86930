//! Document discovery.
//!
//! Walks the input root recursively and collects every file with a markdown
//! extension. The result is a plain value handed to the pipeline — there is
//! no global discovery state.
//!
//! Enumeration order is deterministic (lexicographic by path) so repeated
//! runs over the same tree process documents in the same order and test
//! output is reproducible. Nothing downstream depends on the order for
//! correctness.
//!
//! Unreadable subtrees are not fatal: each failed directory read becomes a
//! [`ScanWarning`] carried alongside the document list, and traversal
//! continues into sibling subtrees. Only a missing or non-directory root
//! aborts the scan.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions recognized as documents.
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("input root is not a directory: {0}")]
    RootNotFound(PathBuf),
}

/// Result of one scan: the documents found plus any subtrees that could
/// not be read.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Document paths, sorted lexicographically.
    pub documents: Vec<PathBuf>,
    /// Non-fatal traversal errors (unreadable directories, broken links).
    pub warnings: Vec<ScanWarning>,
}

/// A subtree or entry the scanner had to skip.
#[derive(Debug)]
pub struct ScanWarning {
    /// Path the error occurred at, when the walker knows it.
    pub path: Option<PathBuf>,
    pub message: String,
}

/// Recursively discover documents under `root`.
pub fn scan(root: &Path) -> Result<ScanOutcome, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }

    let mut outcome = ScanOutcome::default();
    for entry in WalkDir::new(root) {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_document(entry.path()) => {
                outcome.documents.push(entry.into_path());
            }
            Ok(_) => {}
            Err(err) => outcome.warnings.push(ScanWarning {
                path: err.path().map(Path::to_path_buf),
                message: err.to_string(),
            }),
        }
    }

    outcome.documents.sort();
    Ok(outcome)
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.as_str()))
}

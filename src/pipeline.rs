//! The per-run orchestrator.
//!
//! Sequences the full pipeline for a run: scan the input tree, then for
//! each document in order — extract metadata, apply overrides, check the
//! content fingerprint, render HTML, capture PNG, persist the artifact and
//! finally the fingerprint.
//!
//! Per-document state machine:
//!
//! ```text
//! Discovered → Extracted → FingerprintChecked → Skipped
//!                                            └→ Rendering → Captured → FingerprintUpdated
//! ```
//!
//! Any per-document error drops that document into `Failed` and moves on —
//! one bad document never aborts the batch. All outcomes are collected
//! into a [`RunSummary`] and reported at the end of the run. Only
//! run-level setup failures (input root missing, output dir not writable,
//! browser launch, unreadable external template) are fatal.
//!
//! Ordering invariants:
//! - the fingerprint read for a document happens before its render attempt;
//! - the fingerprint write happens only after a successful capture and
//!   artifact write, never before. A failed render leaves the prior record
//!   untouched so the next run retries.
//!
//! Documents are processed sequentially; each one's capture completes
//! before the next starts, so the fingerprint store sees no concurrent
//! writes.

use crate::capture::{CaptureError, ChromeEngine, RenderEngine, Viewport};
use crate::config::{RunConfig, StyleConfig};
use crate::fingerprint::{self, FingerprintStore};
use crate::frontmatter::{self, ExtractError};
use crate::naming;
use crate::scan::{self, ScanError, ScanWarning};
use crate::template::{Renderer, TemplateError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Static-hosting sentinel written once per run.
const NOJEKYLL: &str = ".nojekyll";

/// Fatal run-level errors. Everything per-document is captured in
/// [`DocumentStatus::Failed`] instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Engine(#[from] CaptureError),
}

/// Per-document failure, folded into the run summary.
#[derive(Error, Debug)]
enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
}

/// Terminal state of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Rendered, captured, artifact and fingerprint written.
    Generated,
    /// Fingerprint matched the stored record; nothing written.
    SkippedUnchanged,
    /// A per-document error; nothing written, fingerprint untouched.
    Failed(String),
}

/// One document's run result.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub slug: String,
    pub status: DocumentStatus,
}

/// Everything a run produced, for reporting.
#[derive(Debug)]
pub struct RunSummary {
    pub outcomes: Vec<DocumentOutcome>,
    pub warnings: Vec<ScanWarning>,
}

impl RunSummary {
    pub fn generated(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Generated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::SkippedUnchanged))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DocumentStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&DocumentStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Run the full pipeline with a freshly launched browser.
pub fn run(config: &RunConfig, style: &StyleConfig) -> Result<RunSummary, PipelineError> {
    let engine = ChromeEngine::launch(Viewport::for_style(style))?;
    run_with_engine(&engine, config, style)
}

/// Run the full pipeline against a specific engine (allows testing with a
/// mock).
pub fn run_with_engine(
    engine: &impl RenderEngine,
    config: &RunConfig,
    style: &StyleConfig,
) -> Result<RunSummary, PipelineError> {
    let scanned = scan::scan(&config.input_root)?;
    let renderer = Renderer::from_config(config.template.as_deref())?;

    fs::create_dir_all(&config.output_root)?;
    fs::write(config.output_root.join(NOJEKYLL), "")?;

    let store = FingerprintStore::new(&config.output_root);
    let viewport = Viewport::for_style(style);

    let mut outcomes = Vec::with_capacity(scanned.documents.len());
    for path in &scanned.documents {
        let slug = naming::slug_for(path);
        let status =
            match process_document(engine, &renderer, &store, config, style, viewport, path, &slug)
            {
                Ok(status) => status,
                Err(err) => DocumentStatus::Failed(err.to_string()),
            };
        outcomes.push(DocumentOutcome {
            path: path.clone(),
            slug,
            status,
        });
    }

    Ok(RunSummary {
        outcomes,
        warnings: scanned.warnings,
    })
}

/// Drive one document through the state machine.
#[allow(clippy::too_many_arguments)]
fn process_document(
    engine: &impl RenderEngine,
    renderer: &Renderer,
    store: &FingerprintStore,
    config: &RunConfig,
    style: &StyleConfig,
    viewport: Viewport,
    path: &Path,
    slug: &str,
) -> Result<DocumentStatus, DocumentError> {
    // Discovered → Extracted
    let bytes = fs::read(path)?;
    let mut fields = frontmatter::extract(&String::from_utf8_lossy(&bytes))?;
    fields.apply_overrides(&config.overrides);
    let card = fields.validate()?;

    // Extracted → FingerprintChecked
    let fresh = fingerprint::digest(&bytes);
    let stored = store.load(slug);
    if !fingerprint::needs_render(stored.as_deref(), &fresh, config.force_regenerate) {
        return Ok(DocumentStatus::SkippedUnchanged);
    }

    // Rendering → Captured
    let html = renderer.render(&card, style)?;
    let png = engine.capture(&html, viewport)?;
    fs::write(config.output_root.join(format!("{slug}.png")), &png)?;

    // Captured → FingerprintUpdated. Strictly after the artifact write:
    // a crash between the two leaves the document marked stale, which
    // re-renders next run rather than serving a missing image.
    store.save(slug, &fresh)?;

    Ok(DocumentStatus::Generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::tests::MockEngine;
    use crate::config::Overrides;
    use std::fs;
    use tempfile::TempDir;

    const GOOD_DOC: &str = "---\n\
        title: Hello World\n\
        description: The obligatory first post\n\
        author: Ada\n\
        date: 2024-01-02\n\
        ---\n\
        Body.\n";

    fn setup() -> (TempDir, RunConfig) {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("content");
        let output = tmp.path().join("previews");
        fs::create_dir_all(&input).unwrap();
        let config = RunConfig {
            input_root: input,
            output_root: output,
            force_regenerate: false,
            overrides: Overrides::default(),
            template: None,
        };
        (tmp, config)
    }

    fn write_doc(config: &RunConfig, name: &str, content: &str) {
        let path = config.input_root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn style() -> StyleConfig {
        StyleConfig::default()
    }

    #[test]
    fn generates_artifact_and_fingerprint() {
        let (_tmp, config) = setup();
        write_doc(&config, "2024-01-02-hello-world.md", GOOD_DOC);

        let engine = MockEngine::new();
        let summary = run_with_engine(&engine, &config, &style()).unwrap();

        assert_eq!(summary.generated(), 1);
        assert!(config.output_root.join("hello-world.png").exists());
        assert!(config.output_root.join("hello-world.md5").exists());
        assert_eq!(
            fs::read_to_string(config.output_root.join("hello-world.md5")).unwrap(),
            fingerprint::digest(GOOD_DOC.as_bytes())
        );
    }

    #[test]
    fn nojekyll_written_once_per_run() {
        let (_tmp, config) = setup();
        write_doc(&config, "a.md", GOOD_DOC);

        run_with_engine(&MockEngine::new(), &config, &style()).unwrap();
        assert!(config.output_root.join(".nojekyll").exists());
        assert_eq!(
            fs::read(config.output_root.join(".nojekyll")).unwrap().len(),
            0
        );
    }

    #[test]
    fn unchanged_document_skipped_on_second_run() {
        let (_tmp, config) = setup();
        write_doc(&config, "post.md", GOOD_DOC);

        let first = MockEngine::new();
        run_with_engine(&first, &config, &style()).unwrap();
        assert_eq!(first.capture_count(), 1);

        let png_mtime = fs::metadata(config.output_root.join("post.png"))
            .unwrap()
            .modified()
            .unwrap();

        let second = MockEngine::new();
        let summary = run_with_engine(&second, &config, &style()).unwrap();

        assert_eq!(summary.skipped(), 1);
        assert_eq!(second.capture_count(), 0);
        // Artifact untouched
        assert_eq!(
            fs::metadata(config.output_root.join("post.png"))
                .unwrap()
                .modified()
                .unwrap(),
            png_mtime
        );
    }

    #[test]
    fn changed_document_regenerated() {
        let (_tmp, config) = setup();
        write_doc(&config, "post.md", GOOD_DOC);
        run_with_engine(&MockEngine::new(), &config, &style()).unwrap();

        let updated = GOOD_DOC.replace("Hello World", "Hello Again");
        write_doc(&config, "post.md", &updated);

        let engine = MockEngine::new();
        let summary = run_with_engine(&engine, &config, &style()).unwrap();

        assert_eq!(summary.generated(), 1);
        assert_eq!(engine.capture_count(), 1);
        assert_eq!(
            fs::read_to_string(config.output_root.join("post.md5")).unwrap(),
            fingerprint::digest(updated.as_bytes())
        );
    }

    #[test]
    fn force_regenerates_unchanged_documents() {
        let (_tmp, mut config) = setup();
        write_doc(&config, "post.md", GOOD_DOC);
        run_with_engine(&MockEngine::new(), &config, &style()).unwrap();

        config.force_regenerate = true;
        let engine = MockEngine::new();
        let summary = run_with_engine(&engine, &config, &style()).unwrap();

        assert_eq!(summary.generated(), 1);
        assert_eq!(engine.capture_count(), 1);
    }

    #[test]
    fn failed_capture_leaves_prior_fingerprint_untouched() {
        let (_tmp, config) = setup();
        write_doc(&config, "post.md", GOOD_DOC);
        run_with_engine(&MockEngine::new(), &config, &style()).unwrap();
        let prior = fs::read_to_string(config.output_root.join("post.md5")).unwrap();

        // Change the document so the gate decides to re-render, but make
        // the capture fail.
        let updated = GOOD_DOC.replace("Hello World", "BROKEN TITLE");
        write_doc(&config, "post.md", &updated);

        let engine = MockEngine::failing_on("BROKEN TITLE");
        let summary = run_with_engine(&engine, &config, &style()).unwrap();

        assert_eq!(summary.failed(), 1);
        // Fingerprint still the old one → next run retries
        assert_eq!(
            fs::read_to_string(config.output_root.join("post.md5")).unwrap(),
            prior
        );
    }

    #[test]
    fn failed_first_render_writes_no_fingerprint() {
        let (_tmp, config) = setup();
        write_doc(&config, "post.md", GOOD_DOC);

        let engine = MockEngine::failing_on("Hello World");
        let summary = run_with_engine(&engine, &config, &style()).unwrap();

        assert_eq!(summary.failed(), 1);
        assert!(!config.output_root.join("post.md5").exists());
        assert!(!config.output_root.join("post.png").exists());
    }

    #[test]
    fn missing_required_field_fails_document_without_artifacts() {
        let (_tmp, config) = setup();
        write_doc(&config, "incomplete.md", "---\nauthor: Ada\ndate: 2024-01-02\n---\n");

        let engine = MockEngine::new();
        let summary = run_with_engine(&engine, &config, &style()).unwrap();

        assert_eq!(summary.failed(), 1);
        let DocumentStatus::Failed(reason) = &summary.outcomes[0].status else {
            panic!("expected failure");
        };
        assert!(reason.contains("title"), "got: {reason}");
        assert_eq!(engine.capture_count(), 0);
        assert!(!config.output_root.join("incomplete.png").exists());
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let (_tmp, config) = setup();
        write_doc(&config, "a-bad.md", "---\ntitle: Only Title\n---\n");
        write_doc(&config, "b-good.md", GOOD_DOC);
        write_doc(&config, "c-good.md", &GOOD_DOC.replace("Hello", "Third"));

        let summary = run_with_engine(&MockEngine::new(), &config, &style()).unwrap();

        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.generated(), 2);
        assert!(config.output_root.join("b-good.png").exists());
        assert!(config.output_root.join("c-good.png").exists());
        assert!(!config.output_root.join("a-bad.png").exists());
    }

    #[test]
    fn overrides_flow_into_rendered_html() {
        let (_tmp, mut config) = setup();
        config.overrides = Overrides {
            author: Some("Site Author".to_string()),
            avatar: Some("https://example.com/me.png".to_string()),
        };
        write_doc(&config, "post.md", GOOD_DOC);

        let engine = MockEngine::new();
        run_with_engine(&engine, &config, &style()).unwrap();

        let html = &engine.captured_html()[0];
        assert!(html.contains("Site Author"));
        assert!(!html.contains(">Ada<"));
        assert!(html.contains("https://example.com/me.png"));
    }

    #[test]
    fn external_template_used_when_configured() {
        let (tmp, mut config) = setup();
        let template_path = tmp.path().join("card.html");
        fs::write(&template_path, "<main>{{ title }} / {{ date_formatted }}</main>").unwrap();
        config.template = Some(template_path);
        write_doc(&config, "post.md", GOOD_DOC);

        let engine = MockEngine::new();
        run_with_engine(&engine, &config, &style()).unwrap();

        assert_eq!(
            engine.captured_html()[0],
            "<main>Hello World / Jan 2, 2024</main>"
        );
    }

    #[test]
    fn template_error_is_per_document_not_fatal() {
        let (tmp, mut config) = setup();
        let template_path = tmp.path().join("card.html");
        fs::write(&template_path, "<img src=\"{{ avatar }}\">").unwrap();
        config.template = Some(template_path);

        // First doc has no avatar → template error; second has one.
        write_doc(&config, "a-plain.md", GOOD_DOC);
        write_doc(
            &config,
            "b-avatared.md",
            &GOOD_DOC.replace("---\nBody", "avatar: /me.png\n---\nBody"),
        );

        let summary = run_with_engine(&MockEngine::new(), &config, &style()).unwrap();

        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.generated(), 1);
    }

    #[test]
    fn missing_external_template_is_fatal() {
        let (tmp, mut config) = setup();
        config.template = Some(tmp.path().join("missing.html"));
        write_doc(&config, "post.md", GOOD_DOC);

        let result = run_with_engine(&MockEngine::new(), &config, &style());
        assert!(matches!(result, Err(PipelineError::Template(_))));
    }

    #[test]
    fn missing_input_root_is_fatal() {
        let (tmp, mut config) = setup();
        config.input_root = tmp.path().join("nope");

        let result = run_with_engine(&MockEngine::new(), &config, &style());
        assert!(matches!(result, Err(PipelineError::Scan(_))));
    }

    #[test]
    fn summary_counts_match_outcomes() {
        let (_tmp, config) = setup();
        write_doc(&config, "a.md", GOOD_DOC);
        write_doc(&config, "b.md", "---\ntitle: T\n---\n");

        let summary = run_with_engine(&MockEngine::new(), &config, &style()).unwrap();
        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.generated() + summary.skipped() + summary.failed(), 2);
    }
}

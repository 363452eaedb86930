//! Headless-browser capture of card HTML to PNG.
//!
//! The [`RenderEngine`] trait is the seam between the pipeline and the
//! browser: production uses [`ChromeEngine`] (headless Chrome via the
//! `headless_chrome` crate), tests use a recording mock.
//!
//! # Capture sequence
//!
//! Each step is a hard precondition for the next:
//!
//! 1. Open a fresh tab, scoped to this single document. No cross-document
//!    tab reuse — a wedged page cannot bleed into the next document's
//!    render.
//! 2. Inject the HTML as a percent-encoded `data:` URL and wait for the
//!    document to finish parsing (not network idle — remote images are
//!    awaited separately in step 3).
//! 3. Run an in-page promise that resolves to a `"ready"` sentinel once
//!    every `<img>` has loaded with nonzero natural dimensions and
//!    `document.fonts.ready` has settled. A single failed image rejects
//!    the promise; the evaluate call reports rejections as a returned
//!    error object rather than an `Err`, so the sentinel is checked
//!    explicitly and anything else aborts this document's capture.
//! 4. Screenshot exactly the configured viewport rectangle (clip rect, not
//!    the full scrollable page).
//! 5. Close the tab. The close runs on every exit path, including errors in
//!    steps 2-4, so a failed document never leaks a page.
//!
//! There is no per-step timeout here beyond what `headless_chrome` applies
//! to navigation; callers wanting a bound per document impose one
//! externally.

use crate::config::StyleConfig;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

/// Fixed margin added on all four sides of the card, in px.
pub const PADDING: u32 = 32;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to launch browser: {0}")]
    Launch(anyhow::Error),
    #[error("failed to open page: {0}")]
    Page(anyhow::Error),
    #[error("content injection failed: {0}")]
    ContentInjection(anyhow::Error),
    #[error("embedded resource failed to load: {0}")]
    ResourceLoad(anyhow::Error),
    #[error("screenshot capture failed: {0}")]
    Screenshot(anyhow::Error),
}

/// Pixel dimensions of the captured image: card size plus padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// The capture viewport for a run's style: configured card dimensions
    /// plus the fixed padding margin on all sides.
    pub fn for_style(style: &StyleConfig) -> Self {
        Self {
            width: style.card.width + PADDING * 2,
            height: style.card.height + PADDING * 2,
        }
    }
}

/// The external rendering engine a pipeline drives.
///
/// One call per document; implementations must not share page state
/// between calls.
pub trait RenderEngine {
    /// Rasterize an HTML document to PNG bytes at the given viewport.
    fn capture(&self, html: &str, viewport: Viewport) -> Result<Vec<u8>, CaptureError>;
}

/// In-page wait for render readiness: every image loaded with nonzero
/// natural dimensions, all web fonts ready. Rejects on the first image
/// that fails to load.
const RESOURCES_READY_JS: &str = r#"
(async () => {
    const images = Array.from(document.querySelectorAll('img'));
    await Promise.all([
        document.fonts.ready,
        ...images.map((img) => {
            if (img.complete) {
                if (img.naturalHeight !== 0) return;
                throw new Error('image failed to load: ' + img.src);
            }
            return new Promise((resolve, reject) => {
                img.addEventListener('load', resolve);
                img.addEventListener('error', () =>
                    reject(new Error('image failed to load: ' + img.src)));
            });
        }),
    ]);
    return 'ready';
})()
"#;

/// Production engine: one headless Chrome process per run, one tab per
/// document.
pub struct ChromeEngine {
    browser: Browser,
}

impl ChromeEngine {
    /// Launch a headless browser sized to the run's viewport.
    ///
    /// The viewport is fixed for a whole run (style config is immutable per
    /// run), so the window size is set once at launch rather than per tab.
    pub fn launch(viewport: Viewport) -> Result<Self, CaptureError> {
        let browser = Browser::new(LaunchOptions {
            window_size: Some((viewport.width, viewport.height)),
            ..Default::default()
        })
        .map_err(CaptureError::Launch)?;
        Ok(Self { browser })
    }
}

impl RenderEngine for ChromeEngine {
    fn capture(&self, html: &str, viewport: Viewport) -> Result<Vec<u8>, CaptureError> {
        let tab = self.browser.new_tab().map_err(CaptureError::Page)?;
        let result = capture_on_tab(&tab, html, viewport);
        // Release the tab on every exit path; a close failure is not worth
        // masking the capture result over.
        let _ = tab.close(true);
        result
    }
}

fn capture_on_tab(tab: &Tab, html: &str, viewport: Viewport) -> Result<Vec<u8>, CaptureError> {
    let url = format!(
        "data:text/html;charset=utf-8,{}",
        utf8_percent_encode(html, NON_ALPHANUMERIC)
    );
    tab.navigate_to(&url).map_err(CaptureError::ContentInjection)?;
    tab.wait_until_navigated()
        .map_err(CaptureError::ContentInjection)?;

    let result = tab
        .evaluate(RESOURCES_READY_JS, true)
        .map_err(CaptureError::ResourceLoad)?;
    // A rejected readiness promise comes back as Ok carrying the error
    // object, not as Err; only the sentinel string means every resource
    // actually loaded.
    if let Some(detail) = readiness_failure(
        result.value.as_ref().and_then(|v| v.as_str()),
        result.description.as_deref(),
    ) {
        return Err(CaptureError::ResourceLoad(anyhow::anyhow!(detail)));
    }

    let clip = Page::Viewport {
        x: 0.0,
        y: 0.0,
        width: viewport.width as f64,
        height: viewport.height as f64,
        scale: 1.0,
    };
    tab.capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
        .map_err(CaptureError::Screenshot)
}

/// Interpret the readiness promise result.
///
/// A rejection surfaces as a remote error object whose `description`
/// carries the thrown message; a fulfilled wait returns the `"ready"`
/// sentinel. Returns `None` when ready, otherwise the failure detail.
fn readiness_failure(value: Option<&str>, description: Option<&str>) -> Option<String> {
    match value {
        Some("ready") => None,
        _ => Some(
            description
                .unwrap_or("resource wait did not complete")
                .to_string(),
        ),
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// PNG magic bytes followed by filler — enough for callers that only
    /// check they received image bytes and wrote them somewhere.
    pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nmock";

    /// Mock engine that records captures without touching a browser.
    /// Uses Mutex interior mutability so it satisfies `&self` capture.
    #[derive(Default)]
    pub struct MockEngine {
        pub captures: Mutex<Vec<(String, Viewport)>>,
        /// When set, any capture whose HTML contains this marker fails with
        /// a resource-load error.
        pub fail_when_contains: Option<String>,
    }

    impl MockEngine {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(marker: &str) -> Self {
            Self {
                captures: Mutex::new(Vec::new()),
                fail_when_contains: Some(marker.to_string()),
            }
        }

        pub fn capture_count(&self) -> usize {
            self.captures.lock().unwrap().len()
        }

        pub fn captured_html(&self) -> Vec<String> {
            self.captures
                .lock()
                .unwrap()
                .iter()
                .map(|(html, _)| html.clone())
                .collect()
        }
    }

    impl RenderEngine for MockEngine {
        fn capture(&self, html: &str, viewport: Viewport) -> Result<Vec<u8>, CaptureError> {
            self.captures
                .lock()
                .unwrap()
                .push((html.to_string(), viewport));

            if let Some(marker) = &self.fail_when_contains
                && html.contains(marker)
            {
                return Err(CaptureError::ResourceLoad(anyhow::anyhow!(
                    "mock image load failure"
                )));
            }
            Ok(FAKE_PNG.to_vec())
        }
    }

    #[test]
    fn viewport_adds_padding_on_all_sides() {
        let style = StyleConfig::default();
        let viewport = Viewport::for_style(&style);
        assert_eq!(viewport.width, 1200 + 64);
        assert_eq!(viewport.height, 630 + 64);
    }

    #[test]
    fn mock_records_capture() {
        let engine = MockEngine::new();
        let viewport = Viewport {
            width: 100,
            height: 50,
        };

        let png = engine.capture("<html></html>", viewport).unwrap();
        assert!(png.starts_with(b"\x89PNG"));

        let captures = engine.captures.lock().unwrap();
        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].0, "<html></html>");
        assert_eq!(captures[0].1, viewport);
    }

    #[test]
    fn mock_fails_on_marker() {
        let engine = MockEngine::failing_on("bad-avatar.png");
        let viewport = Viewport {
            width: 100,
            height: 50,
        };

        let err = engine
            .capture("<img src=\"bad-avatar.png\">", viewport)
            .unwrap_err();
        assert!(matches!(err, CaptureError::ResourceLoad(_)));
        // The attempt was still recorded
        assert_eq!(engine.capture_count(), 1);
    }

    #[test]
    fn readiness_sentinel_accepted() {
        assert_eq!(readiness_failure(Some("ready"), None), None);
    }

    #[test]
    fn readiness_rejection_reports_description() {
        let detail = readiness_failure(None, Some("Error: image failed to load: bad.png"));
        assert_eq!(detail.as_deref(), Some("Error: image failed to load: bad.png"));
    }

    #[test]
    fn readiness_unexpected_value_is_failure() {
        assert!(readiness_failure(Some("pending"), None).is_some());
        assert!(readiness_failure(None, None).is_some());
    }
}

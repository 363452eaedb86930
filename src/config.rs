//! Run and style configuration.
//!
//! Configuration is layered, lowest priority first:
//!
//! 1. Stock defaults (the values below, matching the classic GitHub-card look)
//! 2. An optional `cardgen.toml` at the input root
//! 3. CLI flags / environment variables (`HEADER_COLOR`, `HEADER_SIZE`, …)
//!
//! ## Configuration Options
//!
//! ```toml
//! # cardgen.toml — all options optional, defaults shown
//!
//! [card]
//! width = 1200              # Card width in px (viewport, before padding)
//! height = 630              # Card height in px
//!
//! [header]
//! size = 56                 # Title font size in px
//! color = "#0366d6"
//!
//! [description]
//! size = 32
//! color = "#586069"
//!
//! [footer]
//! size = 16
//! color = "#586069"
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! Run-level parameters (input/output roots, force flag, author and avatar
//! overrides, external template path) come from the CLI and are assembled
//! into [`RunConfig`] by `main` — the pipeline only ever sees the resolved
//! struct.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional style config file at the input root.
const CONFIG_FILENAME: &str = "cardgen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Resolved run parameters. Everything the pipeline needs beyond style:
/// where to read, where to write, and the per-run toggles/overrides.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory scanned recursively for markdown documents.
    pub input_root: PathBuf,
    /// Directory receiving `{slug}.png`, `{slug}.md5` and `.nojekyll`.
    pub output_root: PathBuf,
    /// Bypass the fingerprint skip logic and regenerate everything.
    pub force_regenerate: bool,
    /// Author/avatar values injected into every document's metadata.
    pub overrides: Overrides,
    /// External HTML template; `None` means the built-in card generator.
    pub template: Option<PathBuf>,
}

/// Run-level metadata overrides. A non-empty value replaces whatever the
/// document's frontmatter supplied.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub author: Option<String>,
    pub avatar: Option<String>,
}

/// Visual parameters applied uniformly to every card in a run.
///
/// Loaded once, shared read-only across all documents.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    pub card: CardConfig,
    pub header: TextConfig,
    pub description: TextConfig,
    pub footer: TextConfig,
}

/// Card dimensions in px. This is the content viewport; the capture adds a
/// fixed padding margin around it.
#[derive(Debug, Clone, PartialEq)]
pub struct CardConfig {
    pub width: u32,
    pub height: u32,
}

/// Font size and color for one text region of the card.
#[derive(Debug, Clone, PartialEq)]
pub struct TextConfig {
    pub size: u32,
    pub color: String,
}

/// File-shape of `cardgen.toml`: every key individually optional, merged
/// onto the stock defaults. Sections have different defaults, so the merge
/// happens per field rather than per section.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StyleOverlay {
    card: CardOverlay,
    header: TextOverlay,
    description: TextOverlay,
    footer: TextOverlay,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CardOverlay {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TextOverlay {
    size: Option<u32>,
    color: Option<String>,
}

impl StyleOverlay {
    fn apply(self, style: &mut StyleConfig) {
        if let Some(width) = self.card.width {
            style.card.width = width;
        }
        if let Some(height) = self.card.height {
            style.card.height = height;
        }
        self.header.apply(&mut style.header);
        self.description.apply(&mut style.description);
        self.footer.apply(&mut style.footer);
    }
}

impl TextOverlay {
    fn apply(self, text: &mut TextConfig) {
        if let Some(size) = self.size {
            text.size = size;
        }
        if let Some(color) = self.color {
            text.color = color;
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            card: CardConfig::default(),
            header: TextConfig {
                size: 56,
                color: "#0366d6".to_string(),
            },
            description: TextConfig {
                size: 32,
                color: "#586069".to_string(),
            },
            footer: TextConfig {
                size: 16,
                color: "#586069".to_string(),
            },
        }
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 630,
        }
    }
}

impl StyleConfig {
    /// Validate config values are within acceptable ranges.
    ///
    /// Colors are checked strictly because they are interpolated into the
    /// card's inline CSS; a malformed value would silently produce an
    /// unstyled card rather than an error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.card.width == 0 || self.card.height == 0 {
            return Err(ConfigError::Validation(
                "card.width and card.height must be non-zero".into(),
            ));
        }
        for (name, text) in [
            ("header", &self.header),
            ("description", &self.description),
            ("footer", &self.footer),
        ] {
            if text.size == 0 {
                return Err(ConfigError::Validation(format!(
                    "{name}.size must be non-zero"
                )));
            }
            if !is_hex_color(&text.color) {
                return Err(ConfigError::Validation(format!(
                    "{name}.color must be a #rgb or #rrggbb hex color, got {:?}",
                    text.color
                )));
            }
        }
        Ok(())
    }
}

/// True for `#rgb` and `#rrggbb` hex color strings.
fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Load the style config for an input root.
///
/// Reads `cardgen.toml` from the root if present, otherwise uses stock
/// defaults. The result is validated either way.
pub fn load_style(input_root: &Path) -> Result<StyleConfig, ConfigError> {
    let path = input_root.join(CONFIG_FILENAME);
    let mut style = StyleConfig::default();
    if path.exists() {
        let content = fs::read_to_string(&path)?;
        let overlay: StyleOverlay = toml::from_str(&content)?;
        overlay.apply(&mut style);
    }
    style.validate()?;
    Ok(style)
}

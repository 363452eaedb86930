//! Frontmatter extraction and metadata validation.
//!
//! Documents carry their metadata in a leading YAML frontmatter block:
//!
//! ```text
//! ---
//! title: Hello World
//! description: The obligatory first post
//! author: Ada
//! date: 2024-01-02
//! ---
//! Body text (ignored by this tool).
//! ```
//!
//! Parsing is a deliberately small YAML subset — flat `key: value` lines,
//! optional quoting, `#` comments — which covers real-world blog frontmatter
//! without pulling in a full YAML implementation. Nested structures are
//! ignored.
//!
//! Beyond parsing, this module owns:
//!
//! - **Field selection**: only the recognized card fields (`title`,
//!   `description`, `author`, `date`, `avatar`) are kept; everything else in
//!   the block (tags, layout, draft flags, …) is discarded.
//! - **Key normalization**: snake-cased or prefixed variants of the
//!   recognized fields (`og_title`, `page-title`, `card_avatar`) fold into
//!   the canonical names.
//! - **Validation**: after run-level overrides are applied, `title`,
//!   `author` and `date` must be present and non-empty. The error names the
//!   first absent field.
//!
//! Dates are kept raw here; formatting to human-readable form happens at
//! render time in [`crate::template`].

use crate::config::Overrides;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ExtractError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("unterminated frontmatter block (no closing ---)")]
    Unterminated,
}

/// Recognized card fields as found in a document, before validation.
///
/// All fields optional at this stage: run-level overrides may still fill in
/// `author`/`avatar` before [`CardFields::validate`] runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub avatar: Option<String>,
}

/// A validated metadata record, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCard {
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    /// Raw date value as written in the document.
    pub date: String,
    pub avatar: Option<String>,
}

impl CardFields {
    /// Inject run-level author/avatar values. A non-empty override replaces
    /// whatever the document supplied.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(author) = &overrides.author
            && !author.trim().is_empty()
        {
            self.author = Some(author.clone());
        }
        if let Some(avatar) = &overrides.avatar
            && !avatar.trim().is_empty()
        {
            self.avatar = Some(avatar.clone());
        }
    }

    /// Enforce required-field presence, naming the first absent field.
    pub fn validate(self) -> Result<DocumentCard, ExtractError> {
        let required = |v: Option<String>, name: &'static str| {
            v.filter(|s| !s.trim().is_empty())
                .ok_or(ExtractError::MissingField(name))
        };

        Ok(DocumentCard {
            title: required(self.title, "title")?,
            author: required(self.author, "author")?,
            date: required(self.date, "date")?,
            description: self.description.filter(|s| !s.trim().is_empty()),
            avatar: self.avatar.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// Extract the recognized card fields from raw document text.
///
/// A document without a frontmatter block yields empty fields — validation
/// later reports the first missing required field, which matches what a
/// reader of the log needs to know.
pub fn extract(raw: &str) -> Result<CardFields, ExtractError> {
    let Some(block) = frontmatter_block(raw)? else {
        return Ok(CardFields::default());
    };

    let mut fields = CardFields::default();
    for line in block.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        // Indented lines belong to nested structures we don't model.
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let value = unquote(value.trim());
        if value.is_empty() {
            continue;
        }
        let slot = match normalize_key(key) {
            Some("title") => &mut fields.title,
            Some("description") => &mut fields.description,
            Some("author") => &mut fields.author,
            Some("date") => &mut fields.date,
            Some("avatar") => &mut fields.avatar,
            _ => continue,
        };
        *slot = Some(value.to_string());
    }

    Ok(fields)
}

/// Split the leading `---` block out of the document, if present.
///
/// The opening fence must be the whole first line (after an optional BOM);
/// anything else means the document has no frontmatter.
fn frontmatter_block(raw: &str) -> Result<Option<&str>, ExtractError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let Some(rest) = text
        .strip_prefix("---\r\n")
        .or_else(|| text.strip_prefix("---\n"))
    else {
        return Ok(None);
    };

    // Closing fence immediately after the opener: an empty block.
    if rest == "---" || rest.starts_with("---\n") || rest.starts_with("---\r\n") {
        return Ok(Some(""));
    }

    for fence in ["\r\n---\r\n", "\r\n---\n", "\n---\r\n", "\n---\n"] {
        if let Some(end) = rest.find(fence) {
            return Ok(Some(&rest[..end]));
        }
    }
    // Closing fence at the very end of the document.
    if let Some(block) = rest
        .strip_suffix("\r\n---")
        .or_else(|| rest.strip_suffix("\n---"))
    {
        return Ok(Some(block));
    }
    Err(ExtractError::Unterminated)
}

/// Map an arbitrary frontmatter key onto a canonical field name.
///
/// Lowercases, treats dashes as underscores, and strips one recognized
/// prefix — `og_title`, `card-avatar` and `page_description` all land on
/// their canonical counterparts.
fn normalize_key(key: &str) -> Option<&'static str> {
    let lowered = key.trim().to_ascii_lowercase().replace('-', "_");
    let base = ["og_", "card_", "page_", "post_"]
        .iter()
        .find_map(|p| lowered.strip_prefix(p))
        .unwrap_or(&lowered);

    match base {
        "title" => Some("title"),
        "description" => Some("description"),
        "author" => Some("author"),
        "date" => Some("date"),
        "avatar" => Some("avatar"),
        _ => None,
    }
}

/// Strip one matching pair of surrounding quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

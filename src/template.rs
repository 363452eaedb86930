//! Card HTML generation.
//!
//! Turns a validated [`DocumentCard`] plus the run's [`StyleConfig`] into a
//! complete, self-contained HTML document — inline styles only, sized to the
//! configured card dimensions — because the capture engine takes a single
//! still screenshot with no reflow retries.
//!
//! Two interchangeable strategies satisfy the same `render` contract:
//!
//! - **Generator** (the default): a fixed card layout built with
//!   [maud](https://maud.lambda.xyz/). Compile-time checked HTML, type-safe
//!   interpolation, auto-escaped by default. Title on top, optional
//!   description, a footer with the author on the left and the formatted
//!   date on the right, and — only when the record carries an avatar — a
//!   circular avatar image in the right-hand column.
//!
//! - **Template**: a user-supplied HTML file with `{{ field }}` placeholders.
//!   Placeholders are a fixed grammar of field references (`title`,
//!   `description`, `author`, `date`, `date_formatted`, `avatar`) — never
//!   evaluated code. Referencing a field the record doesn't have is a
//!   recoverable error: the document is skipped, the run continues.
//!
//! Dates reach this module raw; [`format_date`] converts recognized forms to
//! `Jan 2, 2024` style at render time and passes anything unrecognized
//! through verbatim.

use crate::config::StyleConfig;
use crate::frontmatter::DocumentCard;
use chrono::NaiveDate;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("failed to read template {0}: {1}")]
    Load(PathBuf, #[source] std::io::Error),
    #[error("template references unknown field: {0}")]
    UnknownField(String),
    #[error("unterminated placeholder at byte {0}")]
    UnterminatedPlaceholder(usize),
}

/// A rendering strategy, resolved once per run.
#[derive(Debug)]
pub enum Renderer {
    /// Built-in maud card generator.
    Generator,
    /// External HTML template with placeholder substitution.
    Template(String),
}

impl Renderer {
    /// Resolve the strategy from the run config: an external template path
    /// if one was given, the built-in generator otherwise.
    pub fn from_config(template: Option<&Path>) -> Result<Self, TemplateError> {
        match template {
            Some(path) => {
                let source = fs::read_to_string(path)
                    .map_err(|e| TemplateError::Load(path.to_path_buf(), e))?;
                Ok(Self::Template(source))
            }
            None => Ok(Self::Generator),
        }
    }

    /// Render a card to a complete HTML document string.
    pub fn render(&self, card: &DocumentCard, style: &StyleConfig) -> Result<String, TemplateError> {
        match self {
            Self::Generator => Ok(render_card(card, style).into_string()),
            Self::Template(source) => substitute(source, card),
        }
    }
}

// ============================================================================
// Generator strategy
// ============================================================================

/// Inline stylesheet for the generated card, with sizes and colors
/// substituted from the style config. Static chrome (borders, shadow,
/// background) matches the classic GitHub article-card look.
fn card_css(style: &StyleConfig) -> String {
    format!(
        "\
body {{ font-family: Arial, sans-serif; margin: 0; padding: 0; background-color: #f6f8fa; }}
.article {{ width: {width}px; height: {height}px; box-sizing: border-box; background-color: #fff; border: 1px solid #e1e4e8; border-radius: 6px; box-shadow: 0 4px 12px rgba(0, 0, 0, 0.1); padding: 32px; position: relative; }}
.container {{ display: flex; }}
.container .left {{ width: 100%; }}
.container .right {{ flex: 0 0 20%; display: flex; justify-content: flex-end; align-items: center; }}
.article-header {{ padding: 32px; display: flex; justify-content: space-between; align-items: center; }}
.article-name {{ font-size: {header_size}px; font-weight: 600; color: {header_color}; flex: 1; }}
.article-description {{ padding: 32px; font-size: {description_size}px; margin-top: 8px; display: flex; color: {description_color}; }}
.article-footer {{ padding: 32px; border-top: 1px solid #e1e4e8; justify-content: space-between; align-items: center; font-size: {footer_size}px; display: flex; width: calc(100% - 2 * 32px); bottom: 0; position: absolute; box-sizing: border-box; color: {footer_color}; }}
.article-footer .left {{ align-self: flex-start; }}
.article-footer .right {{ align-self: flex-end; }}
.avatar {{ border-radius: 50%; }}
",
        width = style.card.width,
        height = style.card.height,
        header_size = style.header.size,
        header_color = style.header.color,
        description_size = style.description.size,
        description_color = style.description.color,
        footer_size = style.footer.size,
        footer_color = style.footer.color,
    )
}

/// Render the built-in card layout.
fn render_card(card: &DocumentCard, style: &StyleConfig) -> Markup {
    // Colors/sizes are validated at config load, so PreEscaped is confined
    // to values that cannot carry markup.
    let css = card_css(style);

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (card.title) }
                style { (PreEscaped(css)) }
            }
            body {
                div.article {
                    div.container {
                        div.left {
                            div.article-header {
                                div.article-name { (card.title) }
                            }
                            @if let Some(description) = &card.description {
                                div.article-description { (description) }
                            }
                        }
                        @if let Some(avatar) = &card.avatar {
                            div.right {
                                img.avatar src=(avatar) alt=(card.author) width="100%";
                            }
                        }
                    }
                    div.article-footer {
                        div.left { (card.author) }
                        div.right {
                            div.card-created { "Created on " (format_date(&card.date)) }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Template strategy
// ============================================================================

/// Substitute `{{ field }}` placeholders in an external template.
///
/// Field values are HTML-escaped on the way in; the template itself is the
/// user's HTML and passes through untouched.
fn substitute(template: &str, card: &DocumentCard) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(TemplateError::UnterminatedPlaceholder(offset + start));
        };
        let name = after[..end].trim();
        out.push_str(&escape_html(&field_value(card, name)?));

        let consumed = start + 2 + end + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Look up a placeholder field on the record.
///
/// Absent optional fields (`description`, `avatar` when the document has
/// none) count as unknown: the template asked for data this record doesn't
/// have, and silently emitting an empty string would produce broken cards
/// (e.g. an `<img src="">`).
fn field_value(card: &DocumentCard, name: &str) -> Result<String, TemplateError> {
    let value = match name {
        "title" => Some(card.title.clone()),
        "description" => card.description.clone(),
        "author" => Some(card.author.clone()),
        "date" => Some(card.date.clone()),
        "date_formatted" => Some(format_date(&card.date)),
        "avatar" => card.avatar.clone(),
        _ => None,
    };
    value.ok_or_else(|| TemplateError::UnknownField(name.to_string()))
}

/// Minimal HTML escaping for substituted field values.
fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Date formatting
// ============================================================================

/// Format a raw frontmatter date as `Jan 2, 2024`.
///
/// Unrecognized values pass through verbatim — a typo'd date should not
/// fail the document, it just renders as written.
pub fn format_date(raw: &str) -> String {
    parse_date(raw.trim())
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

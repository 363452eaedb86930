//! Slug derivation for output artifact names.
//!
//! Every artifact a document produces (the rendered PNG, the fingerprint
//! record) is keyed by a slug derived from the document's filename. Blog
//! trees commonly prefix posts with a date or sequence number
//! (`2024-01-02-hello-world.md`, `001-intro.md`); the slug strips that
//! prefix so artifact names stay stable when posts are renumbered.
//!
//! The rule: take the filename stem and drop everything before the first
//! ASCII letter. A stem with no letters at all is used verbatim.

use std::path::Path;

/// Derive the artifact slug for a document path.
///
/// - `2024-01-02-hello-world.md` → `hello-world`
/// - `001-intro.md` → `intro`
/// - `about.md` → `about`
/// - `0001.md` → `0001` (no letters, stem kept as-is)
pub fn slug_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    match stem.find(|c: char| c.is_ascii_alphabetic()) {
        Some(idx) => stem[idx..].to_string(),
        None => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_date_prefix() {
        assert_eq!(
            slug_for(Path::new("posts/2024-01-02-hello-world.md")),
            "hello-world"
        );
    }

    #[test]
    fn strips_sequence_prefix() {
        assert_eq!(slug_for(Path::new("001-intro.md")), "intro");
    }

    #[test]
    fn plain_name_unchanged() {
        assert_eq!(slug_for(Path::new("about.md")), "about");
    }

    #[test]
    fn extension_always_dropped() {
        assert_eq!(slug_for(Path::new("notes.markdown")), "notes");
    }

    #[test]
    fn letterless_stem_kept_verbatim() {
        assert_eq!(slug_for(Path::new("0001.md")), "0001");
    }

    #[test]
    fn first_letter_wins_even_mid_digits() {
        assert_eq!(slug_for(Path::new("12x34-post.md")), "x34-post");
    }

    #[test]
    fn interior_digits_preserved() {
        assert_eq!(slug_for(Path::new("2024-web3-primer.md")), "web3-primer");
    }
}

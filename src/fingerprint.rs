//! Content fingerprints for incremental generation.
//!
//! Rendering a card is the expensive step of the pipeline — each document
//! costs a headless-browser page load and screenshot. This module lets the
//! pipeline skip documents whose content hasn't changed since the last run.
//!
//! # Design
//!
//! Fingerprints are **content-addressed**: a SHA-256 digest of the raw
//! document bytes, hex-encoded. Content-based rather than mtime-based so it
//! survives `git checkout` (which resets modification times). One record per
//! document, stored next to the rendered image as `{slug}.md5` — the
//! extension is part of the tool's long-standing output contract, predating
//! the switch to SHA-256.
//!
//! A document is regenerated when:
//! 1. No stored fingerprint exists for its slug, or
//! 2. The stored fingerprint differs from the freshly computed one, or
//! 3. The run's force-regenerate flag is set.
//!
//! The stored record is written **only after a render completes
//! successfully**. A failed render leaves the prior record untouched, so the
//! next run retries the document instead of considering it up to date.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// SHA-256 digest of raw document bytes, as a lowercase hex string.
///
/// Deterministic: identical bytes always produce the identical string.
pub fn digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Whether a document needs rendering, given the stored and fresh digests.
pub fn needs_render(stored: Option<&str>, fresh: &str, force: bool) -> bool {
    force || stored != Some(fresh)
}

/// On-disk fingerprint store rooted at the output directory.
#[derive(Debug, Clone)]
pub struct FingerprintStore {
    output_root: PathBuf,
}

impl FingerprintStore {
    pub fn new(output_root: &Path) -> Self {
        Self {
            output_root: output_root.to_path_buf(),
        }
    }

    /// Path of the record for a slug.
    pub fn record_path(&self, slug: &str) -> PathBuf {
        self.output_root.join(format!("{slug}.md5"))
    }

    /// Load the stored fingerprint for a slug, if any.
    ///
    /// A missing or unreadable record means "never rendered" — the caller
    /// regenerates, which also rewrites the record.
    pub fn load(&self, slug: &str) -> Option<String> {
        fs::read_to_string(self.record_path(slug))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Persist the fingerprint for a slug, replacing any prior record.
    ///
    /// Called only after the render for this document has succeeded.
    pub fn save(&self, slug: &str, fingerprint: &str) -> io::Result<()> {
        fs::write(self.record_path(slug), fingerprint)
    }
}

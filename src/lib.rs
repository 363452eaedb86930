//! # Cardgen
//!
//! A social preview card generator for markdown content trees. Each markdown
//! document's front matter becomes a 1200×630 PNG card, rendered as HTML and
//! captured with headless Chrome — suitable for `og:image` / Twitter card
//! tags on static sites.
//!
//! # Architecture: Incremental Render Pipeline
//!
//! Cardgen processes a content tree through a per-document pipeline that is
//! incremental by content fingerprint:
//!
//! ```text
//! 1. Scan         content/   →  ordered document list
//! 2. Extract      document   →  card fields (title, author, date, ...)
//! 3. Fingerprint  document   →  render / skip decision
//! 4. Render       fields     →  card HTML (built-in layout or user template)
//! 5. Capture      HTML       →  {slug}.png via headless Chrome
//! ```
//!
//! Fingerprints are stored next to the artifacts and updated only after a
//! successful capture, so failed renders retry on the next run. One bad
//! document never aborts the batch — failures are collected and reported.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the content tree, collects markdown documents in stable order |
//! | [`frontmatter`] | Extracts and validates card fields from YAML-style front matter |
//! | [`fingerprint`] | SHA-256 content digests and the per-slug record store |
//! | [`template`] | Card HTML rendering: built-in Maud layout or `{{ field }}` templates |
//! | [`capture`] | Headless Chrome screenshot engine behind the [`capture::RenderEngine`] trait |
//! | [`pipeline`] | Per-run orchestration with per-document failure isolation |
//! | [`naming`] | Slug derivation from document filenames |
//! | [`config`] | Run options plus `cardgen.toml` card styling with validation |
//! | [`report`] | CLI output formatting for run results |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! The built-in card layout is generated with [Maud](https://maud.lambda.xyz/),
//! a compile-time HTML macro system. Malformed HTML is a build error, template
//! variables are Rust expressions, and all interpolation is auto-escaped. Users
//! who want a custom layout can still supply an external HTML template with
//! `{{ field }}` placeholders — plain substitution, no code evaluation.
//!
//! ## Real Browser Capture
//!
//! Cards are screenshotted by headless Chrome rather than drawn with a raster
//! library. The layout is ordinary CSS (flexbox, border-radius, web fonts),
//! so authors style cards the way they style pages, and the capture waits for
//! fonts and images before shooting. The browser is the only system
//! dependency; everything else is pure Rust.
//!
//! ## Fingerprints Next to Artifacts
//!
//! Each card's content digest lives in `{slug}.md5` beside `{slug}.png` in
//! the output directory. The output directory is self-describing: deleting it
//! forces a full regeneration, and syncing it preserves incrementality across
//! machines. No database, no manifest file.

pub mod capture;
pub mod config;
pub mod fingerprint;
pub mod frontmatter;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod scan;
pub mod template;

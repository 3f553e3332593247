//! CommonMark rendering for user-authored content.
//!
//! This crate provides the [`MarkdownRenderer`], a pulldown-cmark event loop
//! with a hand-written HTML writer tuned for untrusted community content:
//!
//! - soft line breaks render as `<br>` (hard-wrap)
//! - fenced code blocks get a `highlight <language>` class (defaulting to
//!   `plaintext`) so a syntax-highlighting service can pick them up
//! - raw HTML passes through unfiltered; the allow-list sanitizer downstream
//!   owns tag filtering
//!
//! It also exposes [`regions`], a single-pass scanner for code-like regions
//! (fences and backtick spans) shared by the directive-escaping layer, and
//! [`quirks`] for legacy emphasis compatibility.

pub mod quirks;
pub mod regions;
mod renderer;

pub use regions::{CodeRegion, RegionKind, scan_code_regions};
pub use renderer::{MarkdownRenderer, escape_html};

//! Directive engine for `{% name args %}` embeds in community content.
//!
//! Content authors embed rich media with a small directive language:
//!
//! ```text
//! {% youtube dQw4w9WgXcQ %}
//! {% wikipedia https://en.wikipedia.org/wiki/Rust_(programming_language) %}
//! ```
//!
//! # Architecture
//!
//! - [`escape`]: wraps code regions in `{% raw %}`/`{% endraw %}` markers so
//!   directive syntax inside code stays literal.
//! - [`scanner`]: tokenizes text into literal, raw, directive, and variable
//!   segments.
//! - [`TagRegistry`]: an immutable, startup-built map from directive name to
//!   [`TagHandler`], plus the registration-ordered URL pattern list backing
//!   unified embeds.
//! - [`engine`]: expands directives against a registry, and the lenient
//!   [`engine::tags_used`] query.
//!
//! The registry is built once at process start and shared (`Send + Sync`)
//! across concurrent renders; there is no ambient global registration.

pub mod engine;
pub mod escape;
pub mod handlers;
mod context;
mod error;
mod http;
mod registry;
pub mod scanner;

pub use context::TagContext;
pub use error::TagError;
pub use http::create_agent;
pub use registry::{DuplicateTag, RegistryBuilder, TagHandler, TagRegistry};

//! Markdown-to-HTML content pipeline for community-authored posts.
//!
//! The [`Pipeline`] turns raw markdown into final display HTML:
//!
//! 1. XSS gate over the raw input;
//! 2. code-region escaping so directive syntax inside code stays literal;
//! 3. markdown rendering (first pass);
//! 4. allow-list sanitization;
//! 5. `{% name args %}` directive expansion against a [`TagRegistry`];
//! 6. markdown rendering again, for markdown produced by directives;
//! 7. the HTML rewrite chain (images, code controls, tables, emoji,
//!    autolinks, mentions, figures).
//!
//! ```no_run
//! use std::sync::Arc;
//! use scribe::{ParseRequest, Pipeline, RewriteChain, RewriteConfig, TagRegistry};
//!
//! let registry = Arc::new(TagRegistry::with_builtins());
//! let rewrite = RewriteChain::new(RewriteConfig::new("https://community.example"));
//! let pipeline = Pipeline::new(registry, rewrite);
//!
//! let result = pipeline.render(&ParseRequest::new("# Hello\n\n{% youtube dQw4w9WgXcQ %}"))?;
//! println!("{}", result.html);
//! # Ok::<(), scribe::RenderError>(())
//! ```

mod error;
mod pipeline;
mod request;
mod sanitize;
mod xss;

pub use error::RenderError;
pub use pipeline::{calculate_reading_time, Pipeline};
pub use request::{ParseRequest, RenderResult};
pub use sanitize::sanitize;

pub use scribe_markdown::MarkdownRenderer;
pub use scribe_rewrite::{RewriteChain, RewriteConfig, UserLookup};
pub use scribe_tags::{
    DuplicateTag, RegistryBuilder, TagContext, TagError, TagHandler, TagRegistry,
};

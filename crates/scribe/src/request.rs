//! Render request and result types.

use std::collections::{BTreeSet, HashMap};

/// One piece of content to render, with its ownership context.
///
/// Immutable once built; the pipeline never writes back into it.
#[derive(Debug, Clone, Default)]
pub struct ParseRequest {
    /// The author's raw markdown.
    pub raw_content: String,
    /// Identifier of the record owning the content.
    pub source_ref: Option<String>,
    /// Identifier of the authoring user.
    pub author_ref: Option<String>,
    /// Free-form options forwarded to directive handlers.
    pub options: HashMap<String, String>,
}

impl ParseRequest {
    #[must_use]
    pub fn new(raw_content: impl Into<String>) -> Self {
        Self {
            raw_content: raw_content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }

    #[must_use]
    pub fn with_author_ref(mut self, author_ref: impl Into<String>) -> Self {
        self.author_ref = Some(author_ref.into());
        self
    }

    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Output of a successful render.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// The final processed HTML.
    pub html: String,
    /// Estimated reading time in whole minutes.
    pub reading_time_minutes: usize,
    /// Registered directive names the content used.
    pub tags_used: BTreeSet<String>,
}

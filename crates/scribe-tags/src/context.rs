//! Per-render context passed to tag handlers.

use std::collections::HashMap;

/// Context for one render call, shared by every directive in the content.
///
/// The refs are opaque identifiers owned by the caller (an article id, a
/// user id); handlers may embed them in fragments but never interpret them.
#[derive(Debug, Clone, Default)]
pub struct TagContext {
    /// Identifier of the record owning the content.
    pub source_ref: Option<String>,
    /// Identifier of the authoring user.
    pub author_ref: Option<String>,
    /// Free-form handler options supplied by the caller.
    pub options: HashMap<String, String>,
}

impl TagContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the owning-record identifier.
    #[must_use]
    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }

    /// Set the authoring-user identifier.
    #[must_use]
    pub fn with_author_ref(mut self, author_ref: impl Into<String>) -> Self {
        self.author_ref = Some(author_ref.into());
        self
    }

    /// Add a handler option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

//! Error types for directive parsing and rendering.

/// Error from parsing or rendering directives.
///
/// Every variant is fatal for the render that produced it: the engine never
/// drops a bad directive and continues.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TagError {
    /// Malformed `{% %}` / `{{ }}` structure.
    #[error("directive syntax error: {0}")]
    Syntax(String),

    /// Directive name not present in the registry.
    #[error("unknown directive '{0}'")]
    UnknownTag(String),

    /// A known tag rejected its argument string.
    #[error("{tag}: {message}")]
    InvalidArgument {
        /// Name of the tag that rejected the argument.
        tag: &'static str,
        /// Handler-specific description of what was wrong.
        message: String,
    },

    /// A tag's outbound request failed or returned an error status.
    ///
    /// Never retried here; retries belong to the caller.
    #[error("{tag}: upstream request failed: {detail}")]
    Upstream {
        /// Name of the tag whose request failed.
        tag: &'static str,
        /// Provider-specific detail (status, body excerpt, transport error).
        detail: String,
    },
}

impl TagError {
    /// Shorthand for an invalid-argument error.
    pub(crate) fn invalid(tag: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            tag,
            message: message.into(),
        }
    }
}

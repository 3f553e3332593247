//! Pipeline error types.

use scribe_tags::TagError;

/// Error from a full pipeline render.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The raw content tripped the XSS gate; nothing was rendered.
    #[error("content rejected: {0}")]
    XssDetected(String),

    /// A directive failed to parse or render.
    #[error(transparent)]
    Tag(#[from] TagError),
}

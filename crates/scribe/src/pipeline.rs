//! The end-to-end render pipeline.

use std::sync::Arc;

use scribe_markdown::quirks::normalize_intraword_emphasis;
use scribe_markdown::MarkdownRenderer;
use scribe_rewrite::RewriteChain;
use scribe_tags::escape::{convert_code_tags_to_triple_backticks, escape_code_regions};
use scribe_tags::{engine, TagContext, TagRegistry};

use crate::request::{ParseRequest, RenderResult};
use crate::{sanitize, xss, RenderError};

/// Words-per-minute divisor for the reading-time estimate.
const WORDS_READ_PER_MINUTE: usize = 275;

/// The full markdown-to-HTML pipeline.
///
/// Holds no per-render state; one pipeline serves concurrent renders.
pub struct Pipeline {
    registry: Arc<TagRegistry>,
    renderer: MarkdownRenderer,
    rewrite: RewriteChain,
}

impl Pipeline {
    #[must_use]
    pub fn new(registry: Arc<TagRegistry>, rewrite: RewriteChain) -> Self {
        Self {
            registry,
            renderer: MarkdownRenderer::new(),
            rewrite,
        }
    }

    /// Render raw markdown to final HTML.
    ///
    /// Stage order: XSS gate, code-tag normalization, code-region escaping,
    /// emphasis normalization, markdown, sanitize, directive expansion,
    /// markdown again, rewrite chain. The second markdown pass renders
    /// markdown produced by directive fragments; everything already HTML
    /// passes through it structurally.
    ///
    /// # Errors
    ///
    /// [`RenderError::XssDetected`] before any rendering, or
    /// [`RenderError::Tag`] from directive expansion.
    pub fn render(&self, request: &ParseRequest) -> Result<RenderResult, RenderError> {
        xss::scan(&request.raw_content)?;

        let content = convert_code_tags_to_triple_backticks(&request.raw_content);
        let content = escape_code_regions(&content);
        let content = normalize_intraword_emphasis(&content);

        let first_pass = self.renderer.render(&content);
        let sanitized = sanitize::sanitize(&first_pass);

        let ctx = tag_context(request);
        let expanded = engine::expand(&sanitized, &self.registry, &ctx)?;
        let expanded = isolate_pre_blocks(&expanded);

        let second_pass = self.renderer.render(&expanded);
        let html = self.rewrite.apply(&second_pass);

        Ok(RenderResult {
            html,
            reading_time_minutes: calculate_reading_time(&request.raw_content),
            tags_used: engine::tags_used(&content, &self.registry),
        })
    }

}

/// Put a blank line before every `<pre>` so the second markdown pass treats
/// it as its own raw HTML block.
///
/// A `<pre` line that merely continues an open HTML block would lose its
/// protection at the first blank line inside the code; a `<pre` line that
/// starts a block keeps everything through the closing `</pre>` verbatim.
fn isolate_pre_blocks(html: &str) -> String {
    if !html.contains("<pre") {
        return html.to_owned();
    }
    html.replace("\n<pre", "\n\n<pre")
}

fn tag_context(request: &ParseRequest) -> TagContext {
    let mut ctx = TagContext::new();
    ctx.source_ref.clone_from(&request.source_ref);
    ctx.author_ref.clone_from(&request.author_ref);
    ctx.options.clone_from(&request.options);
    ctx
}

/// Estimated reading time in whole minutes, rounded up.
///
/// Words are maximal runs of word characters in the raw markdown, so markup
/// punctuation does not inflate the count. Empty content reads in zero
/// minutes.
#[must_use]
pub fn calculate_reading_time(raw_content: &str) -> usize {
    let words = raw_content
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .count();
    words.div_ceil(WORDS_READ_PER_MINUTE)
}

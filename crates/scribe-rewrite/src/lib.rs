//! HTML rewrite chain applied after the second markdown pass.
//!
//! Each pass is a pure string-to-string function over a small token walker;
//! the chain fixes their order. All passes are safe to re-run on their own
//! output, so rendering stored HTML again does not duplicate wrappers.

pub mod walker;

mod code;
mod media;
mod text;

use std::sync::Arc;

pub use code::{add_fullscreen_button, add_panel_to_code_blocks, restore_raw_markers, wrap_code_blocks};
pub use media::{prefix_relative_image_sources, wrap_figcaptions, wrap_images_with_links, wrap_tables};
pub use text::{
    autolink_urls, expand_emoji_shortcodes, link_mentions, remove_empty_paragraphs,
    remove_list_linebreaks,
};

/// Resolves `@username` mentions to real users.
///
/// Implementations are shared across concurrent renders.
pub trait UserLookup: Send + Sync {
    /// True if a user with this (lowercased) username exists.
    fn exists(&self, username: &str) -> bool;
}

impl UserLookup for std::collections::HashSet<String> {
    fn exists(&self, username: &str) -> bool {
        self.contains(username)
    }
}

/// Settings shared by the URL-producing passes.
#[derive(Debug, Clone)]
pub struct RewriteConfig {
    /// Origin prefixed to site-relative image sources and profile links,
    /// without a trailing slash.
    pub site_url: String,
}

impl RewriteConfig {
    #[must_use]
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }
}

/// The ordered rewrite passes.
pub struct RewriteChain {
    config: RewriteConfig,
    user_lookup: Option<Arc<dyn UserLookup>>,
}

impl RewriteChain {
    #[must_use]
    pub fn new(config: RewriteConfig) -> Self {
        Self {
            config,
            user_lookup: None,
        }
    }

    /// Enable the mention-linking pass.
    #[must_use]
    pub fn with_user_lookup(mut self, lookup: Arc<dyn UserLookup>) -> Self {
        self.user_lookup = Some(lookup);
        self
    }

    /// Run every pass, in order, over the rendered HTML.
    #[must_use]
    pub fn apply(&self, html: &str) -> String {
        let site_url = &self.config.site_url;
        tracing::trace!(input_len = html.len(), "applying rewrite chain");

        let html = remove_list_linebreaks(html);
        let html = prefix_relative_image_sources(&html, site_url);
        let html = wrap_images_with_links(&html);
        let html = wrap_code_blocks(&html);
        let html = add_panel_to_code_blocks(&html);
        let html = add_fullscreen_button(&html);
        let html = wrap_tables(&html);
        let html = remove_empty_paragraphs(&html);
        let html = expand_emoji_shortcodes(&html);
        let html = restore_raw_markers(&html);
        let html = autolink_urls(&html);
        let html = wrap_figcaptions(&html);
        match &self.user_lookup {
            Some(lookup) => link_mentions(&html, site_url, lookup.as_ref()),
            None => html,
        }
    }
}

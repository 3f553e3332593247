//! `{% nexttech %}` embed.

use std::sync::LazyLock;

use regex::Regex;

use crate::handlers::strip_tags;
use crate::{TagContext, TagError, TagHandler};

static SHARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?nt\.dev/s/[a-z0-9]{12}/?$").expect("static pattern")
});
static EMBED_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://nt\.dev/s/").expect("static pattern"));
static QUERY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?.*").expect("static pattern"));

/// Embeds a Next Tech sandbox from its share URL.
///
/// Valid share URLs:
///   - `https://nt.dev/s/123456abcdef`
///   - `http://nt.dev/s/123456abcdef/`
///   - `nt.dev/s/123456abcdef`
pub struct NexttechTag;

impl NexttechTag {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The share token at the end of the share URL.
    fn parse_token(args: &str) -> Result<String, TagError> {
        let cleaned = strip_tags(args).replace(' ', "");
        let cleaned = QUERY_SUFFIX.replace(&cleaned, "");

        if !SHARE_URL.is_match(&cleaned) {
            return Err(TagError::invalid(
                "nexttech",
                format!("invalid share URL: '{cleaned}'"),
            ));
        }

        let token = cleaned
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        Ok(token.to_owned())
    }
}

impl Default for NexttechTag {
    fn default() -> Self {
        Self::new()
    }
}

impl TagHandler for NexttechTag {
    fn name(&self) -> &'static str {
        "nexttech"
    }

    fn url_pattern(&self) -> Option<&Regex> {
        Some(&EMBED_URL)
    }

    fn render(&self, args: &str, _ctx: &TagContext) -> Result<String, TagError> {
        let token = Self::parse_token(args)?;
        Ok(format!(
            "<iframe class=\"media-nexttech\" src=\"https://nt.dev/s/{token}/embed\" \
             width=\"100%\" height=\"540\" loading=\"lazy\"></iframe>\n"
        ))
    }
}

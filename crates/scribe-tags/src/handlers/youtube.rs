//! `{% youtube %}` embed.

use std::sync::LazyLock;

use regex::Regex;

use crate::handlers::{first_token, strip_tags};
use crate::{TagContext, TagError, TagHandler};

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("static pattern"));
static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?(?:youtube\.com/watch\?v=|youtu\.be/)([a-zA-Z0-9_-]{11})")
        .expect("static pattern")
});

/// Embeds a YouTube player for a video id or watch URL.
pub struct YoutubeTag;

impl YoutubeTag {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn parse_id(args: &str) -> Result<String, TagError> {
        let stripped = strip_tags(args);
        let input = first_token(&stripped);

        if VIDEO_ID.is_match(input) {
            return Ok(input.to_owned());
        }
        if let Some(caps) = VIDEO_URL.captures(input) {
            return Ok(caps[1].to_owned());
        }
        Err(TagError::invalid(
            "youtube",
            format!("invalid YouTube id or URL: '{input}'"),
        ))
    }
}

impl Default for YoutubeTag {
    fn default() -> Self {
        Self::new()
    }
}

impl TagHandler for YoutubeTag {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn url_pattern(&self) -> Option<&Regex> {
        Some(&VIDEO_URL)
    }

    fn render(&self, args: &str, _ctx: &TagContext) -> Result<String, TagError> {
        let id = Self::parse_id(args)?;
        Ok(format!(
            "<iframe class=\"media-youtube\" width=\"710\" height=\"399\" \
             src=\"https://www.youtube.com/embed/{id}\" \
             allowfullscreen loading=\"lazy\"></iframe>\n"
        ))
    }
}

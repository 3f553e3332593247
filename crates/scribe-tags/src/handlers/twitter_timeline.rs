//! `{% twitter_timeline %}` embed.

use std::sync::LazyLock;

use regex::Regex;

use crate::handlers::strip_tags;
use crate::{TagContext, TagError, TagHandler};

static TIMELINE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://twitter\.com/[a-zA-Z0-9]+/timelines/\d+$").expect("static pattern")
});

const WIDGETS_SCRIPT: &str =
    "<script async src=\"https://platform.twitter.com/widgets.js\" charset=\"utf-8\"></script>";

/// Embeds a curated Twitter timeline.
///
/// The anchor is upgraded client-side by the widgets script appended after
/// it.
pub struct TwitterTimelineTag;

impl TwitterTimelineTag {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn parse_link(args: &str) -> Result<String, TagError> {
        let href = strip_tags(args).trim().to_owned();
        if !TIMELINE_URL.is_match(&href) {
            return Err(TagError::invalid(
                "twitter_timeline",
                format!("invalid timeline URL: '{href}'"),
            ));
        }
        Ok(href)
    }
}

impl Default for TwitterTimelineTag {
    fn default() -> Self {
        Self::new()
    }
}

impl TagHandler for TwitterTimelineTag {
    fn name(&self) -> &'static str {
        "twitter_timeline"
    }

    fn url_pattern(&self) -> Option<&Regex> {
        Some(&TIMELINE_URL)
    }

    fn render(&self, args: &str, _ctx: &TagContext) -> Result<String, TagError> {
        let href = Self::parse_link(args)?;
        Ok(format!(
            "<a class=\"twitter-timeline\" href=\"{href}\">Twitter timeline</a>\n{WIDGETS_SCRIPT}\n"
        ))
    }
}

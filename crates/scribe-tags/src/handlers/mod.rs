//! Built-in directive handlers.

mod jsfiddle;
mod nexttech;
mod twitter_timeline;
mod wikipedia;
mod youtube;

use std::sync::LazyLock;

use regex::Regex;

pub use jsfiddle::JsfiddleTag;
pub use nexttech::NexttechTag;
pub use twitter_timeline::TwitterTimelineTag;
pub use wikipedia::WikipediaTag;
pub use youtube::YoutubeTag;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static pattern"));

/// Remove any HTML tags from a raw argument string.
///
/// Arguments arrive from markdown-rendered text, so stray markup (an
/// autolinked `<a>`, a `<em>` from an underscore) must not reach URL
/// validation.
pub(crate) fn strip_tags(input: &str) -> String {
    HTML_TAG.replace_all(input, "").into_owned()
}

/// First whitespace-delimited token of a stripped argument string.
pub(crate) fn first_token(args: &str) -> &str {
    args.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags_removes_markup() {
        assert_eq!(
            strip_tags("<a href=\"https://x.example\">https://x.example</a>"),
            "https://x.example"
        );
    }

    #[test]
    fn test_strip_tags_plain_passthrough() {
        assert_eq!(strip_tags("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("  https://a.example  js,html "), "https://a.example");
        assert_eq!(first_token(""), "");
    }
}

//! `{% jsfiddle %}` embed.

use std::sync::LazyLock;

use regex::Regex;

use crate::handlers::strip_tags;
use crate::{TagContext, TagError, TagHandler};

static FIDDLE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://jsfiddle\.net/[a-zA-Z0-9\-/]*$").expect("static pattern")
});
static FIDDLE_OPTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(js|html|css|result|,)*$").expect("static pattern"));

/// Embeds a JSFiddle in its embedded-view iframe.
///
/// Arguments are the fiddle link optionally followed by pane names
/// (`js`, `html`, `css`, `result`), which select the tabs the embed shows.
pub struct JsfiddleTag;

impl JsfiddleTag {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validated link with a guaranteed trailing slash, plus the pane
    /// selection path segment (`"js,result/"` or empty).
    fn parse_args(args: &str) -> Result<(String, String), TagError> {
        let stripped = strip_tags(args);
        let mut tokens = stripped.split_whitespace();
        let link = tokens.next().unwrap_or("");

        if !FIDDLE_LINK.is_match(link) {
            return Err(TagError::invalid(
                "jsfiddle",
                format!("invalid JSFiddle URL: '{link}'"),
            ));
        }

        let options: Vec<&str> = tokens.collect();
        for option in &options {
            if !FIDDLE_OPTIONS.is_match(option) {
                return Err(TagError::invalid(
                    "jsfiddle",
                    format!("invalid embed option: '{option}'"),
                ));
            }
        }

        let link = if link.ends_with('/') {
            link.to_owned()
        } else {
            format!("{link}/")
        };
        let panes = if options.is_empty() {
            String::new()
        } else {
            format!("{}/", options.join(","))
        };
        Ok((link, panes))
    }
}

impl Default for JsfiddleTag {
    fn default() -> Self {
        Self::new()
    }
}

impl TagHandler for JsfiddleTag {
    fn name(&self) -> &'static str {
        "jsfiddle"
    }

    fn url_pattern(&self) -> Option<&Regex> {
        Some(&FIDDLE_LINK)
    }

    fn render(&self, args: &str, _ctx: &TagContext) -> Result<String, TagError> {
        let (link, panes) = Self::parse_args(args)?;
        Ok(format!(
            "<iframe class=\"media-jsfiddle\" src=\"{link}embedded/{panes}\" \
             width=\"100%\" height=\"600\" loading=\"lazy\"></iframe>\n"
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_link_only() {
        let (link, panes) = JsfiddleTag::parse_args("https://jsfiddle.net/link2twenty/v2kx9jcd").unwrap();
        assert_eq!(link, "https://jsfiddle.net/link2twenty/v2kx9jcd/");
        assert_eq!(panes, "");
    }

    #[test]
    fn test_pane_options_joined() {
        let (_, panes) =
            JsfiddleTag::parse_args("https://jsfiddle.net/a/b js html result").unwrap();
        assert_eq!(panes, "js,html,result/");
    }

    #[test]
    fn test_rejects_unknown_option() {
        assert!(JsfiddleTag::parse_args("https://jsfiddle.net/a/b frames").is_err());
    }

    #[test]
    fn test_rejects_foreign_host() {
        assert!(JsfiddleTag::parse_args("https://evil.example/jsfiddle.net/a").is_err());
    }

    #[test]
    fn test_render_embedded_src() {
        let html = JsfiddleTag::new()
            .render("https://jsfiddle.net/a/b js", &TagContext::new())
            .unwrap();
        assert!(html.contains("src=\"https://jsfiddle.net/a/b/embedded/js/\""));
    }
}

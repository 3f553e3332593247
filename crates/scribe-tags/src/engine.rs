//! Directive expansion against a registry.

use std::collections::BTreeSet;

use crate::handlers::{first_token, strip_tags};
use crate::scanner::{self, Segment};
use crate::{TagContext, TagError, TagRegistry};

/// Expand every directive in `content` to its HTML fragment.
///
/// Raw segments pass through verbatim (markers consumed). Bare URL lines in
/// literal text are dispatched through the registry's URL patterns; a line
/// that matches no pattern stays as-is.
///
/// # Errors
///
/// Propagates the first [`TagError`] from scanning or from a handler; the
/// engine never drops a failing directive and continues.
pub fn expand(
    content: &str,
    registry: &TagRegistry,
    ctx: &TagContext,
) -> Result<String, TagError> {
    let segments = scanner::scan(content)?;
    let mut out = String::with_capacity(content.len());

    for segment in segments {
        match segment {
            Segment::Text(text) => expand_bare_urls(text, registry, ctx, &mut out)?,
            Segment::Raw(raw) => out.push_str(raw),
            Segment::Tag { name, args } => {
                let fragment = render_tag(name, args, registry, ctx)?;
                out.push_str(&fragment);
            }
            Segment::Variable(expr) => {
                return Err(TagError::Syntax(format!(
                    "variables are not supported: '{{{{ {expr} }}}}'"
                )));
            }
        }
    }

    Ok(out)
}

/// Names of registered directives the content uses, in sorted order.
///
/// This is a lenient query for indexing and feature detection: content that
/// fails to scan yields an empty set, and unregistered names are skipped.
/// Bare URL embeds are not counted; only explicit directives are.
#[must_use]
pub fn tags_used(content: &str, registry: &TagRegistry) -> BTreeSet<String> {
    let segments = match scanner::scan(content) {
        Ok(segments) => segments,
        Err(error) => {
            tracing::debug!(error = %error, "directive scan failed; reporting no tags");
            return BTreeSet::new();
        }
    };

    segments
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Tag { name, args } => {
                if name == "embed" {
                    let url = clean_url_arg(args);
                    registry.match_url(&url).map(|h| h.name().to_owned())
                } else {
                    registry.get(name).map(|h| h.name().to_owned())
                }
            }
            _ => None,
        })
        .collect()
}

fn render_tag(
    name: &str,
    args: &str,
    registry: &TagRegistry,
    ctx: &TagContext,
) -> Result<String, TagError> {
    if name == "embed" {
        let url = clean_url_arg(args);
        let handler = registry.match_url(&url).ok_or_else(|| {
            TagError::InvalidArgument {
                tag: "embed",
                message: format!("no embed source matches '{url}'"),
            }
        })?;
        return handler.render(&url, ctx);
    }

    let handler = registry
        .get(name)
        .ok_or_else(|| TagError::UnknownTag(name.to_owned()))?;
    handler.render(args, ctx)
}

/// Strip markup and HTML entity escaping from a URL argument.
fn clean_url_arg(args: &str) -> String {
    let stripped = strip_tags(args);
    first_token(&stripped).replace("&amp;", "&")
}

/// Replace whole lines that consist of a single URL with the matching
/// handler's fragment.
///
/// The directive engine runs on markdown-rendered HTML, so a pasted URL
/// line usually arrives as `<p>https://…</p>`.
fn expand_bare_urls(
    text: &str,
    registry: &TagRegistry,
    ctx: &TagContext,
    out: &mut String,
) -> Result<(), TagError> {
    for line in text.split_inclusive('\n') {
        match bare_url_of_line(line) {
            Some(url) => match registry.match_url(&url) {
                Some(handler) => {
                    out.push_str(&handler.render(&url, ctx)?);
                    if line.ends_with('\n') && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
                None => out.push_str(line),
            },
            None => out.push_str(line),
        }
    }
    Ok(())
}

/// The URL if the line is exactly one URL, optionally wrapped in a `<p>`.
fn bare_url_of_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let inner = trimmed
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>"))
        .unwrap_or(trimmed);

    let is_url = inner.starts_with("http://") || inner.starts_with("https://");
    if !is_url || inner.contains(char::is_whitespace) || inner.contains('<') {
        return None;
    }
    Some(inner.replace("&amp;", "&"))
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use pretty_assertions::assert_eq;
    use regex::Regex;

    use super::*;
    use crate::TagHandler;

    struct EchoTag;

    impl TagHandler for EchoTag {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn render(&self, args: &str, _ctx: &TagContext) -> Result<String, TagError> {
            Ok(format!("<div class=\"echo\">{args}</div>"))
        }
    }

    static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^https://video\.example/[a-z0-9]+$").expect("static pattern")
    });

    struct VideoTag;

    impl TagHandler for VideoTag {
        fn name(&self) -> &'static str {
            "video"
        }

        fn url_pattern(&self) -> Option<&Regex> {
            Some(&VIDEO_URL)
        }

        fn render(&self, args: &str, _ctx: &TagContext) -> Result<String, TagError> {
            Ok(format!("<iframe src=\"{}\"></iframe>", args.trim()))
        }
    }

    fn registry() -> TagRegistry {
        TagRegistry::builder()
            .register(EchoTag)
            .unwrap()
            .register(VideoTag)
            .unwrap()
            .build()
    }

    #[test]
    fn test_expands_known_tag() {
        let html = expand("{% echo hello %}", &registry(), &TagContext::new()).unwrap();
        assert_eq!(html, "<div class=\"echo\">hello</div>");
    }

    #[test]
    fn test_unknown_tag_is_error() {
        let result = expand("{% mystery %}", &registry(), &TagContext::new());
        assert!(matches!(result, Err(TagError::UnknownTag(name)) if name == "mystery"));
    }

    #[test]
    fn test_variables_are_rejected() {
        let result = expand("{{ 'x' }}", &registry(), &TagContext::new());
        assert!(matches!(result, Err(TagError::Syntax(_))));
    }

    #[test]
    fn test_raw_passes_through_without_markers() {
        let html = expand("{% raw %}{% echo hi %}{% endraw %}", &registry(), &TagContext::new())
            .unwrap();
        assert_eq!(html, "{% echo hi %}");
    }

    #[test]
    fn test_embed_dispatches_by_url() {
        let html = expand(
            "{% embed https://video.example/abc123 %}",
            &registry(),
            &TagContext::new(),
        )
        .unwrap();
        assert_eq!(html, "<iframe src=\"https://video.example/abc123\"></iframe>");
    }

    #[test]
    fn test_embed_without_match_is_error() {
        let result = expand(
            "{% embed https://nowhere.example/x %}",
            &registry(),
            &TagContext::new(),
        );
        assert!(matches!(result, Err(TagError::InvalidArgument { tag: "embed", .. })));
    }

    #[test]
    fn test_bare_url_line_is_embedded() {
        let html = expand(
            "<p>https://video.example/abc123</p>\n",
            &registry(),
            &TagContext::new(),
        )
        .unwrap();
        assert_eq!(html, "<iframe src=\"https://video.example/abc123\"></iframe>\n");
    }

    #[test]
    fn test_unmatched_bare_url_left_alone() {
        let input = "<p>https://nowhere.example/x</p>\n";
        let html = expand(input, &registry(), &TagContext::new()).unwrap();
        assert_eq!(html, input);
    }

    #[test]
    fn test_url_inside_sentence_left_alone() {
        let input = "<p>see https://video.example/abc123 for more</p>\n";
        let html = expand(input, &registry(), &TagContext::new()).unwrap();
        assert_eq!(html, input);
    }

    #[test]
    fn test_tags_used_reports_explicit_tags() {
        let used = tags_used("{% echo a %} and {% echo b %}", &registry());
        assert_eq!(used.into_iter().collect::<Vec<_>>(), vec!["echo"]);
    }

    #[test]
    fn test_tags_used_resolves_embed() {
        let used = tags_used("{% embed https://video.example/abc %}", &registry());
        assert_eq!(used.into_iter().collect::<Vec<_>>(), vec!["video"]);
    }

    #[test]
    fn test_tags_used_is_lenient_on_syntax_errors() {
        assert!(tags_used("{% echo", &registry()).is_empty());
    }

    #[test]
    fn test_tags_used_skips_unknown_names() {
        assert!(tags_used("{% mystery %}", &registry()).is_empty());
    }
}

//! Escaping of directive syntax inside code regions.
//!
//! Before markdown rendering, every code-like region is wrapped in a fresh
//! `{% raw %}`/`{% endraw %}` pair so the directive engine treats its
//! contents as literal text. Raw markers the author already typed inside
//! code are first neutralized to a reversible escaped form
//! (`{----% raw %----}`), which the HTML rewrite chain restores at the very
//! end of the pipeline.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use scribe_markdown::scan_code_regions;

/// Escaped form of `{% raw %}` used inside wrapped code regions.
pub const ESCAPED_RAW: &str = "{----% raw %----}";
/// Escaped form of `{% endraw %}` used inside wrapped code regions.
pub const ESCAPED_ENDRAW: &str = "{----% endraw %----}";

static LONE_CODE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^</?code>$").expect("static pattern"));
static LONE_OPEN_CODE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^<code>$").expect("static pattern"));

/// Wrap every code region in `{% raw %}` / `{% endraw %}` markers.
///
/// Fenced blocks get the markers on their own lines; inline spans get them
/// inline. Pre-existing raw markers inside a region are neutralized first so
/// the wrap cannot be terminated early from within.
#[must_use]
pub fn escape_code_regions(content: &str) -> String {
    let regions = scan_code_regions(content);
    if regions.is_empty() {
        return content.to_owned();
    }

    let mut out = String::with_capacity(content.len() + regions.len() * 32);
    let mut cursor = 0;

    for region in regions {
        out.push_str(&content[cursor..region.start]);

        let body = &content[region.start..region.end];
        let body = body
            .replace("{% endraw %}", ESCAPED_ENDRAW)
            .replace("{% raw %}", ESCAPED_RAW);

        if region.kind.is_fence() {
            out.push_str("\n{% raw %}\n");
            out.push_str(&body);
            out.push_str("\n{% endraw %}\n");
        } else {
            out.push_str("{% raw %}");
            out.push_str(&body);
            out.push_str("{% endraw %}");
        }

        cursor = region.end;
    }

    out.push_str(&content[cursor..]);
    out
}

/// Normalize WYSIWYG-style block `<code>` tags to triple-backtick fences.
///
/// Only applies when a line consists of exactly `<code>` and no `<pre>`
/// appears anywhere in the input; inline `<code>…</code>` and real
/// `<pre><code>` HTML are left alone.
#[must_use]
pub fn convert_code_tags_to_triple_backticks(content: &str) -> Cow<'_, str> {
    if !LONE_OPEN_CODE_TAG.is_match(content) {
        return Cow::Borrowed(content);
    }
    if content.contains("<pre>") {
        return Cow::Borrowed(content);
    }
    LONE_CODE_TAG_LINE.replace_all(content, "\n```\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_directives_in_fenced_block() {
        let escaped = escape_code_regions("```\n{% what %}\n```");
        assert_eq!(escaped, "\n{% raw %}\n```\n{% what %}\n```\n{% endraw %}\n");
    }

    #[test]
    fn test_escapes_inline_code() {
        let escaped = escape_code_regions("`{% what %}`");
        assert_eq!(escaped, "{% raw %}`{% what %}`{% endraw %}");
    }

    #[test]
    fn test_escapes_double_backtick_span() {
        let escaped = escape_code_regions("``{% what %}``");
        assert_eq!(escaped, "{% raw %}``{% what %}``{% endraw %}");
    }

    #[test]
    fn test_neutralizes_existing_raw_markers() {
        let escaped = escape_code_regions("```\n{% raw %}some text{% endraw %}\n```");
        assert!(escaped.contains(ESCAPED_RAW));
        assert!(escaped.contains(ESCAPED_ENDRAW));
        // Exactly one live pair: the wrapper.
        assert_eq!(escaped.matches("{% raw %}").count(), 1);
        assert_eq!(escaped.matches("{% endraw %}").count(), 1);
    }

    #[test]
    fn test_text_outside_regions_untouched() {
        let escaped = escape_code_regions("before `x` after");
        assert_eq!(escaped, "before {% raw %}`x`{% endraw %} after");
    }

    #[test]
    fn test_no_regions_returns_input() {
        assert_eq!(escape_code_regions("plain {% youtube x %}"), "plain {% youtube x %}");
    }

    #[test]
    fn test_converts_block_code_tags() {
        let content = "<code>\n this is some random code \n</code>";
        let converted = convert_code_tags_to_triple_backticks(content);
        assert!(!converted.contains("<code>"));
        assert!(!converted.contains("</code>"));
        assert!(converted.contains("```"));
    }

    #[test]
    fn test_converts_multiple_code_tag_pairs() {
        let content = "<code>\n first \n</code>\n\n<code>\n second \n</code>";
        let converted = convert_code_tags_to_triple_backticks(content);
        assert!(!converted.contains("<code>"));
        assert!(converted.contains("```"));
    }

    #[test]
    fn test_leaves_pre_code_alone() {
        let content = "<pre>\n<code>\n this is some random code \n</code>\n</pre>";
        let converted = convert_code_tags_to_triple_backticks(content);
        assert_eq!(converted, content);
    }

    #[test]
    fn test_leaves_inline_code_alone() {
        let content = "<code> this is some random code </code>";
        assert_eq!(convert_code_tags_to_triple_backticks(content), content);
    }

    #[test]
    fn test_returns_borrowed_without_code_tag() {
        let content = "this is some random code";
        assert!(matches!(
            convert_code_tags_to_triple_backticks(content),
            Cow::Borrowed(_)
        ));
    }
}

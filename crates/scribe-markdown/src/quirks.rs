//! Legacy emphasis compatibility.
//!
//! Community content written for the previous renderer relies on intraword
//! double-underscore emphasis: `word__italic__` renders as
//! `word_<em>italic</em>_`. CommonMark forbids underscore emphasis inside a
//! word, so this module rewrites the construct to intraword asterisk
//! emphasis (`word_*italic*_`) before parsing. Intraword single underscores
//! (`word_italic_`) stay literal.

use std::sync::LazyLock;

use regex::Regex;

use crate::regions::scan_code_regions;

static INTRAWORD_DOUBLE_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)__([^_\s][^_]*)__").expect("static pattern"));

/// Rewrite intraword `__emphasis__` so CommonMark honors it.
///
/// Code regions are left untouched so literal identifiers like
/// `` `dunder__name__` `` survive.
#[must_use]
pub fn normalize_intraword_emphasis(content: &str) -> String {
    let regions = scan_code_regions(content);
    if regions.is_empty() {
        return rewrite(content);
    }

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for region in regions {
        out.push_str(&rewrite(&content[cursor..region.start]));
        out.push_str(&content[region.start..region.end]);
        cursor = region.end;
    }
    out.push_str(&rewrite(&content[cursor..]));
    out
}

fn rewrite(text: &str) -> String {
    INTRAWORD_DOUBLE_UNDERSCORE
        .replace_all(text, "${1}_*${2}*_")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intraword_double_underscore_rewritten() {
        assert_eq!(
            normalize_intraword_emphasis("word__italic__"),
            "word_*italic*_"
        );
    }

    #[test]
    fn test_plain_double_underscore_untouched() {
        // Leading __strong__ is ordinary strong emphasis.
        assert_eq!(normalize_intraword_emphasis("__strong__"), "__strong__");
    }

    #[test]
    fn test_single_underscore_untouched() {
        assert_eq!(normalize_intraword_emphasis("word_italic_"), "word_italic_");
    }

    #[test]
    fn test_code_span_untouched() {
        assert_eq!(
            normalize_intraword_emphasis("`obj__attr__` and word__em__"),
            "`obj__attr__` and word_*em*_"
        );
    }

    #[test]
    fn test_fenced_block_untouched() {
        let content = "```\nname__mangled__\n```";
        assert_eq!(normalize_intraword_emphasis(content), content);
    }
}

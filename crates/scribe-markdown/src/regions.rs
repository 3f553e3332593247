//! Code-region scanning over raw markdown text.
//!
//! Finds the spans of text that markdown treats as literal code: tilde and
//! backtick fences plus double- and single-backtick spans. The directive
//! layer wraps these regions in raw markers so `{% %}` syntax inside code is
//! never expanded, and the emphasis quirks skip them.
//!
//! Implemented as an explicit single-pass scanner rather than one large regex
//! alternation, which avoids catastrophic backtracking on adversarial input.
//!
//! Nesting policy: regions are matched in priority order (tilde fence,
//! backtick fence, double span, single span) from left to right. A region
//! opened by one delimiter runs to the next occurrence of that same
//! delimiter; delimiter-looking text of another kind inside it is literal
//! region content. An unclosed delimiter is not a region.

/// The delimiter kind that opened a code region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// `~~~` fenced block.
    TildeFence,
    /// Triple-backtick fenced block.
    BacktickFence,
    /// Double-backtick span.
    DoubleSpan,
    /// Single-backtick span.
    SingleSpan,
}

impl RegionKind {
    /// Whether this region is a block-level fence.
    #[must_use]
    pub fn is_fence(self) -> bool {
        matches!(self, Self::TildeFence | Self::BacktickFence)
    }
}

/// A code-like region in the source text, delimiters included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRegion {
    pub kind: RegionKind,
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset one past the closing delimiter.
    pub end: usize,
}

/// Scan `content` for code regions in priority order.
///
/// Returns non-overlapping regions sorted by start offset.
#[must_use]
pub fn scan_code_regions(content: &str) -> Vec<CodeRegion> {
    let bytes = content.as_bytes();
    let mut regions = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &content[i..];
        let matched = match_region_at(rest, i);

        match matched {
            Some(region) => {
                i = region.end;
                regions.push(region);
            }
            None => {
                // Jump to the next delimiter candidate.
                i += content[i..]
                    .char_indices()
                    .skip(1)
                    .find(|&(_, c)| c == '`' || c == '~')
                    .map_or(rest.len(), |(idx, _)| idx);
            }
        }
    }

    regions
}

/// Try to match a region starting exactly at `offset` (where `rest` begins).
fn match_region_at(rest: &str, offset: usize) -> Option<CodeRegion> {
    if rest.starts_with("~~~") {
        return close_delimited(rest, offset, "~~~", RegionKind::TildeFence, 0);
    }
    if rest.starts_with("```") {
        return close_delimited(rest, offset, "```", RegionKind::BacktickFence, 0);
    }
    if rest.starts_with("``") {
        // Spans need at least one character between the delimiters.
        return close_delimited(rest, offset, "``", RegionKind::DoubleSpan, 1);
    }
    if rest.starts_with('`') {
        return close_delimited(rest, offset, "`", RegionKind::SingleSpan, 1);
    }
    None
}

/// Find the closing delimiter and build the region.
fn close_delimited(
    rest: &str,
    offset: usize,
    delim: &str,
    kind: RegionKind,
    min_inner: usize,
) -> Option<CodeRegion> {
    let inner_start = delim.len() + min_inner;
    let close = rest.get(inner_start..)?.find(delim)?;
    let end_rel = inner_start + close + delim.len();

    Some(CodeRegion {
        kind,
        start: offset,
        end: offset + end_rel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(content: &str) -> Vec<RegionKind> {
        scan_code_regions(content).iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_no_regions() {
        assert!(scan_code_regions("plain text").is_empty());
    }

    #[test]
    fn test_backtick_fence() {
        let content = "before\n```\ncode\n```\nafter";
        let regions = scan_code_regions(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::BacktickFence);
        assert_eq!(&content[regions[0].start..regions[0].end], "```\ncode\n```");
    }

    #[test]
    fn test_tilde_fence() {
        let content = "~~~\ncode\n~~~";
        let regions = scan_code_regions(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::TildeFence);
        assert_eq!(regions[0].start, 0);
        assert_eq!(regions[0].end, content.len());
    }

    #[test]
    fn test_tilde_fence_swallows_backticks() {
        // Backtick-fence-looking text inside a tilde fence is literal content.
        let content = "~~~\nhello\n```\nwhatever\n```\n~~~";
        assert_eq!(kinds(content), vec![RegionKind::TildeFence]);
    }

    #[test]
    fn test_single_span() {
        let content = "a `span` b";
        let regions = scan_code_regions(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(&content[regions[0].start..regions[0].end], "`span`");
    }

    #[test]
    fn test_double_span() {
        let content = "`` `word` ``";
        let regions = scan_code_regions(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::DoubleSpan);
        assert_eq!(regions[0].end, content.len());
    }

    #[test]
    fn test_unclosed_delimiter_is_not_a_region() {
        assert!(scan_code_regions("a `unclosed").is_empty());
        assert!(scan_code_regions("```\nnever closed").is_empty());
    }

    #[test]
    fn test_multiple_regions() {
        let content = "`a` and ```\nblock\n``` and `b`";
        assert_eq!(
            kinds(content),
            vec![
                RegionKind::SingleSpan,
                RegionKind::BacktickFence,
                RegionKind::SingleSpan
            ]
        );
    }

    #[test]
    fn test_indented_fence_in_list() {
        let content = "1. item\n\n    ```yaml\n    key: value\n\n    ```\n";
        let regions = scan_code_regions(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::BacktickFence);
    }

    #[test]
    fn test_fence_closes_at_next_delimiter_even_mid_line() {
        // The closer is the next ``` anywhere, not only a fence line.
        let content = "```\nfoo ``` bar\n```";
        let regions = scan_code_regions(content);
        assert_eq!(&content[regions[0].start..regions[0].end], "```\nfoo ```");
    }

    #[test]
    fn test_span_crossing_newline() {
        // The closing delimiter may sit on a later line.
        let content = "``code\nstill code``";
        let regions = scan_code_regions(content);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].end, content.len());
    }
}

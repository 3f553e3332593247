//! Rewrite passes for images, tables, and figures.

use std::collections::HashMap;

use crate::walker::{attr, has_class, tokenize, Token};

/// Prefix site-relative `src="/…"` image sources with the site URL.
#[must_use]
pub fn prefix_relative_image_sources(html: &str, site_url: &str) -> String {
    let tokens = tokenize(html);
    let mut out = String::with_capacity(html.len());

    for token in &tokens {
        match token {
            Token::Open { name, raw, .. } if name == "img" => {
                match attr(raw, "src") {
                    Some(src) if src.starts_with('/') && !src.starts_with("//") => {
                        let old = format!("src=\"{src}\"");
                        let new = format!("src=\"{}{src}\"", site_url.trim_end_matches('/'));
                        out.push_str(&raw.replacen(&old, &new, 1));
                    }
                    _ => out.push_str(raw),
                }
            }
            other => out.push_str(other.raw()),
        }
    }

    out
}

/// Wrap every `<img>` not already inside an `<a>` in a link to its source.
#[must_use]
pub fn wrap_images_with_links(html: &str) -> String {
    let tokens = tokenize(html);
    let mut out = String::with_capacity(html.len() + 64);
    let mut anchor_depth = 0usize;

    for token in &tokens {
        match token {
            Token::Open {
                name,
                raw,
                self_closing,
            } => {
                if name == "a" && !self_closing {
                    anchor_depth += 1;
                }
                if name == "img" && anchor_depth == 0 {
                    if let Some(src) = attr(raw, "src") {
                        out.push_str(&format!(
                            "<a href=\"{src}\" class=\"article-body-image-wrapper\">{raw}</a>"
                        ));
                        continue;
                    }
                }
                out.push_str(raw);
            }
            Token::Close { name, raw } => {
                if name == "a" {
                    anchor_depth = anchor_depth.saturating_sub(1);
                }
                out.push_str(raw);
            }
            other => out.push_str(other.raw()),
        }
    }

    out
}

/// Wrap every `<table>` in a horizontally scrollable container.
#[must_use]
pub fn wrap_tables(html: &str) -> String {
    let tokens = tokenize(html);
    let mut out = String::with_capacity(html.len() + 64);
    let mut stack: Vec<&str> = Vec::new();
    let mut wrapped_depth: Option<usize> = None;

    for token in &tokens {
        match token {
            Token::Open {
                name,
                raw,
                self_closing: false,
            } => {
                if name == "table"
                    && !matches!(stack.last(), Some(&"table-wrapper") )
                {
                    out.push_str("<div class=\"table-wrapper-paragraph\">");
                    wrapped_depth = Some(stack.len());
                }
                stack.push(if name == "div" && has_class(raw, "table-wrapper-paragraph") {
                    "table-wrapper"
                } else {
                    "element"
                });
                out.push_str(raw);
            }
            Token::Close { name, raw } => {
                stack.pop();
                out.push_str(raw);
                if name == "table" && wrapped_depth == Some(stack.len()) {
                    out.push_str("</div>");
                    wrapped_depth = None;
                }
            }
            other => out.push_str(other.raw()),
        }
    }

    out
}

/// Wrap a `<figcaption>` and its immediately preceding sibling in a
/// `<figure>`.
///
/// A caption with no preceding sibling, or one already inside a figure, is
/// left alone.
#[must_use]
pub fn wrap_figcaptions(html: &str) -> String {
    let tokens = tokenize(html);
    let mut before: HashMap<usize, &str> = HashMap::new();
    let mut after: HashMap<usize, &str> = HashMap::new();

    let mut stack: Vec<String> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Open {
                name,
                self_closing: false,
                ..
            } => {
                if name == "figcaption" && stack.last().map(String::as_str) != Some("figure") {
                    if let Some((start, end)) = figure_bounds(&tokens, i) {
                        before.insert(start, "<figure>");
                        after.insert(end, "</figure>");
                    }
                }
                stack.push(name.clone());
            }
            Token::Close { .. } => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut out = String::with_capacity(html.len() + 32);
    for (i, token) in tokens.iter().enumerate() {
        if let Some(tag) = before.get(&i) {
            out.push_str(tag);
        }
        out.push_str(token.raw());
        if let Some(tag) = after.get(&i) {
            out.push_str(tag);
        }
    }
    out
}

/// Token span to wrap for the figcaption opened at `open_idx`: the start of
/// its preceding sibling and the index of its own close tag.
fn figure_bounds(tokens: &[Token<'_>], open_idx: usize) -> Option<(usize, usize)> {
    // Preceding sibling, skipping whitespace.
    let mut j = open_idx;
    let sibling_end = loop {
        j = j.checked_sub(1)?;
        match &tokens[j] {
            Token::Text(text) if text.trim().is_empty() => {}
            _ => break j,
        }
    };

    let start = match &tokens[sibling_end] {
        // A close tag: walk back to its matching open.
        Token::Close { .. } => {
            let mut depth = 0usize;
            let mut k = sibling_end;
            loop {
                match &tokens[k] {
                    Token::Close { .. } => depth += 1,
                    Token::Open {
                        self_closing: false,
                        ..
                    } => {
                        depth -= 1;
                        if depth == 0 {
                            break k;
                        }
                    }
                    _ => {}
                }
                k = k.checked_sub(1)?;
            }
        }
        // The parent's own open tag means there is no preceding sibling.
        Token::Open {
            self_closing: false,
            ..
        } => return None,
        _ => sibling_end,
    };

    // Matching close of the figcaption itself.
    let mut depth = 0usize;
    let end = tokens[open_idx..].iter().position(|t| match t {
        Token::Open {
            self_closing: false,
            ..
        } => {
            depth += 1;
            false
        }
        Token::Close { .. } => {
            depth -= 1;
            depth == 0
        }
        _ => false,
    })?;

    Some((start, open_idx + end))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_prefixes_relative_src() {
        let out = prefix_relative_image_sources(
            "<img src=\"/uploads/pic.png\" alt=\"x\">",
            "https://community.example",
        );
        assert_eq!(
            out,
            "<img src=\"https://community.example/uploads/pic.png\" alt=\"x\">"
        );
    }

    #[test]
    fn test_absolute_src_untouched() {
        let html = "<img src=\"https://cdn.example/pic.png\">";
        assert_eq!(prefix_relative_image_sources(html, "https://a.example"), html);
    }

    #[test]
    fn test_wraps_bare_image() {
        let out = wrap_images_with_links("<p><img src=\"/pic.png\"></p>");
        assert_eq!(
            out,
            "<p><a href=\"/pic.png\" class=\"article-body-image-wrapper\"><img src=\"/pic.png\"></a></p>"
        );
    }

    #[test]
    fn test_linked_image_untouched() {
        let html = "<a href=\"https://x.example\"><img src=\"/pic.png\"></a>";
        assert_eq!(wrap_images_with_links(html), html);
    }

    #[test]
    fn test_wraps_table() {
        let out = wrap_tables("<table><tr><td>x</td></tr></table>");
        assert_eq!(
            out,
            "<div class=\"table-wrapper-paragraph\"><table><tr><td>x</td></tr></table></div>"
        );
    }

    #[test]
    fn test_wrap_tables_idempotent() {
        let once = wrap_tables("<table><tr><td>x</td></tr></table>");
        assert_eq!(wrap_tables(&once), once);
    }

    #[test]
    fn test_wraps_figcaption_with_sibling() {
        let out = wrap_figcaptions("<p><img src=\"/x.png\"></p>\n<figcaption>cap</figcaption>");
        assert_eq!(
            out,
            "<figure><p><img src=\"/x.png\"></p>\n<figcaption>cap</figcaption></figure>"
        );
    }

    #[test]
    fn test_figcaption_without_sibling_untouched() {
        let html = "<div><figcaption>cap</figcaption></div>";
        assert_eq!(wrap_figcaptions(html), html);
    }

    #[test]
    fn test_figcaption_in_figure_untouched() {
        let html = "<figure><img src=\"/x.png\"><figcaption>cap</figcaption></figure>";
        assert_eq!(wrap_figcaptions(html), html);
    }
}

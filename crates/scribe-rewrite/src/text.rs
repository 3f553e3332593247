//! Rewrite passes over text content: list linebreaks, empty paragraphs,
//! emoji shortcodes, bare-URL autolinking, and user mentions.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::walker::{tokenize, Token};
use crate::UserLookup;

static EMOJI_SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-zA-Z0-9_+-]+):").expect("static pattern"));

// \B keeps emails out: a word character before the @ makes the position a
// word boundary.
static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B@([a-zA-Z0-9_-]{2,30})").expect("static pattern"));

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bhttps?://[^\s<>"]+"#).expect("static pattern"));

/// Remove `<br>` nodes that sit directly inside `ul`, `ol`, or `li`.
#[must_use]
pub fn remove_list_linebreaks(html: &str) -> String {
    let tokens = tokenize(html);
    let mut out = String::with_capacity(html.len());
    let mut stack: Vec<String> = Vec::new();

    for token in &tokens {
        match token {
            Token::Open {
                name,
                raw,
                self_closing,
            } => {
                if name == "br"
                    && matches!(stack.last().map(String::as_str), Some("ul" | "ol" | "li"))
                {
                    continue;
                }
                if !self_closing {
                    stack.push(name.clone());
                }
                out.push_str(raw);
            }
            Token::Close { raw, .. } => {
                stack.pop();
                out.push_str(raw);
            }
            other => out.push_str(other.raw()),
        }
    }

    out
}

/// Drop paragraphs whose entire content is whitespace.
#[must_use]
pub fn remove_empty_paragraphs(html: &str) -> String {
    let tokens = tokenize(html);
    let mut out = String::with_capacity(html.len());
    let mut i = 0;

    while i < tokens.len() {
        if let Token::Open {
            name,
            self_closing: false,
            ..
        } = &tokens[i]
        {
            if name == "p" {
                if let Some(close_idx) = empty_paragraph_end(&tokens, i) {
                    i = close_idx + 1;
                    continue;
                }
            }
        }
        out.push_str(tokens[i].raw());
        i += 1;
    }

    out
}

/// Index of the close tag if the paragraph at `open_idx` holds only
/// whitespace.
fn empty_paragraph_end(tokens: &[Token<'_>], open_idx: usize) -> Option<usize> {
    for (offset, token) in tokens[open_idx + 1..].iter().enumerate() {
        match token {
            Token::Text(text) if text.trim().is_empty() => {}
            Token::Close { name, .. } if name == "p" => return Some(open_idx + 1 + offset),
            _ => return None,
        }
    }
    None
}

/// Replace `:shortcode:` sequences outside code regions with emoji glyphs.
///
/// Unknown shortcodes stay literal.
#[must_use]
pub fn expand_emoji_shortcodes(html: &str) -> String {
    rewrite_text_outside(html, &["code", "pre"], |text| {
        EMOJI_SHORTCODE
            .replace_all(text, |caps: &Captures<'_>| {
                emojis::get_by_shortcode(&caps[1].to_ascii_lowercase())
                    .map_or_else(|| caps[0].to_owned(), |emoji| emoji.as_str().to_owned())
            })
            .into_owned()
    })
}

/// Turn bare `http(s)` URLs in text into links.
///
/// URLs inside code or existing anchors are left alone. Trailing sentence
/// punctuation stays outside the link.
#[must_use]
pub fn autolink_urls(html: &str) -> String {
    rewrite_text_outside(html, &["code", "pre", "a"], |text| {
        BARE_URL
            .replace_all(text, |caps: &Captures<'_>| {
                let full = &caps[0];
                let url = full.trim_end_matches(['.', ',', ';', ':', '!', '?']);
                let trailing = &full[url.len()..];
                format!("<a href=\"{url}\">{url}</a>{trailing}")
            })
            .into_owned()
    })
}

/// Link `@username` mentions to the user's profile.
///
/// Only names the lookup resolves become links; everything else stays
/// literal text. Mentions inside code or existing anchors are never
/// touched.
#[must_use]
pub fn link_mentions(html: &str, site_url: &str, lookup: &dyn UserLookup) -> String {
    let site = site_url.trim_end_matches('/');
    rewrite_text_outside(html, &["code", "pre", "a"], |text| {
        MENTION
            .replace_all(text, |caps: &Captures<'_>| {
                let username = caps[1].to_ascii_lowercase();
                if lookup.exists(&username) {
                    format!(
                        "<a class=\"mentioned-user\" href=\"{site}/{username}\">@{}</a>",
                        &caps[1]
                    )
                } else {
                    caps[0].to_owned()
                }
            })
            .into_owned()
    })
}

/// Apply `rewrite` to every text token not nested inside any of the given
/// elements.
fn rewrite_text_outside(
    html: &str,
    excluded: &[&str],
    rewrite: impl Fn(&str) -> String,
) -> String {
    let tokens = tokenize(html);
    let mut out = String::with_capacity(html.len());
    let mut excluded_depth = 0usize;

    for token in &tokens {
        match token {
            Token::Open {
                name,
                raw,
                self_closing: false,
            } => {
                if excluded.contains(&name.as_str()) {
                    excluded_depth += 1;
                }
                out.push_str(raw);
            }
            Token::Close { name, raw } => {
                if excluded.contains(&name.as_str()) {
                    excluded_depth = excluded_depth.saturating_sub(1);
                }
                out.push_str(raw);
            }
            Token::Text(text) => {
                if excluded_depth == 0 {
                    out.push_str(&rewrite(text));
                } else {
                    out.push_str(text);
                }
            }
            other => out.push_str(other.raw()),
        }
    }

    out
}

//! Rewrite passes for highlighted code blocks.

use scribe_tags::escape::{ESCAPED_ENDRAW, ESCAPED_RAW};

use crate::walker::{has_class, tokenize, Token};

const WRAPPER_OPEN: &str = "<div class=\"highlight js-code-highlight\">\n";

const ACTIONS_PANEL: &str = "<div class=\"highlight__panel js-actions-panel\"></div>\n";

const FULLSCREEN_ACTIONS: &str = concat!(
    "<div class=\"highlight__panel-action js-fullscreen-code-action\">",
    "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"24\" height=\"24\" viewBox=\"0 0 24 24\" ",
    "class=\"highlight-action highlight-action--fullscreen-on\">",
    "<path d=\"M16 3h6v6h-2V5h-4V3zM2 3h6v2H4v4H2V3zm18 16v-4h2v6h-6v-2h4zM4 19h4v2H2v-6h2v4z\"></path></svg>",
    "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"24\" height=\"24\" viewBox=\"0 0 24 24\" ",
    "class=\"highlight-action highlight-action--fullscreen-off hidden\">",
    "<path d=\"M18 7h4v2h-6V3h2v4zM8 9H2V7h4V3h2v6zm10 8v4h-2v-6h6v2h-4zM8 15v6H6v-4H2v-2h6z\"></path></svg>",
    "</div>"
);

/// Wrap every `<pre class="highlight …">` in the control wrapper div.
///
/// Blocks already inside a `div.highlight` are left alone, so the pass is
/// safe on its own output.
#[must_use]
pub fn wrap_code_blocks(html: &str) -> String {
    let tokens = tokenize(html);
    let mut out = String::with_capacity(html.len() + 64);
    let mut wrapped_depth: Option<usize> = None;
    let mut wrapper_depth: Option<usize> = None;
    let mut depth = 0usize;

    for token in &tokens {
        match token {
            Token::Open {
                name,
                raw,
                self_closing: false,
            } => {
                if name == "div" && has_class(raw, "highlight") && wrapper_depth.is_none() {
                    wrapper_depth = Some(depth);
                }
                if name == "pre" && has_class(raw, "highlight") && wrapper_depth.is_none() {
                    out.push_str(WRAPPER_OPEN);
                    wrapped_depth = Some(depth);
                }
                depth += 1;
                out.push_str(raw);
            }
            Token::Close { name, raw } => {
                depth = depth.saturating_sub(1);
                out.push_str(raw);
                if name == "pre" && wrapped_depth == Some(depth) {
                    out.push_str("</div>\n");
                    wrapped_depth = None;
                }
                if name == "div" && wrapper_depth == Some(depth) {
                    wrapper_depth = None;
                }
            }
            other => out.push_str(other.raw()),
        }
    }

    out
}

/// Inject the empty actions panel as the first child of each wrapper.
#[must_use]
pub fn add_panel_to_code_blocks(html: &str) -> String {
    let tokens = tokenize(html);
    let mut out = String::with_capacity(html.len() + 64);

    for (i, token) in tokens.iter().enumerate() {
        out.push_str(token.raw());
        if let Token::Open { name, raw, .. } = token {
            if name == "div"
                && has_class(raw, "js-code-highlight")
                && !next_open_has_class(&tokens[i + 1..], "js-actions-panel")
            {
                out.push_str(ACTIONS_PANEL);
            }
        }
    }

    out
}

/// Add the fullscreen toggle to every empty actions panel.
#[must_use]
pub fn add_fullscreen_button(html: &str) -> String {
    let tokens = tokenize(html);
    let mut out = String::with_capacity(html.len() + 64);
    let mut in_empty_panel = false;

    for token in &tokens {
        match token {
            Token::Open { name, raw, .. } => {
                if name == "div" && has_class(raw, "js-actions-panel") {
                    in_empty_panel = true;
                } else if in_empty_panel {
                    // Panel already has content.
                    in_empty_panel = false;
                }
                out.push_str(raw);
            }
            Token::Close { name, raw } => {
                if in_empty_panel && name == "div" {
                    out.push_str(FULLSCREEN_ACTIONS);
                    in_empty_panel = false;
                }
                out.push_str(raw);
            }
            other => out.push_str(other.raw()),
        }
    }

    out
}

/// Restore neutralized raw markers to their literal form.
///
/// The markers only survive this far inside code, where the escaper put
/// them; everywhere else they were consumed by the directive engine.
#[must_use]
pub fn restore_raw_markers(html: &str) -> String {
    if !html.contains("{----%") {
        return html.to_owned();
    }
    html.replace(ESCAPED_RAW, "{% raw %}")
        .replace(ESCAPED_ENDRAW, "{% endraw %}")
}

/// True if the next open tag among `tokens` carries the class.
fn next_open_has_class(tokens: &[Token<'_>], class: &str) -> bool {
    for token in tokens {
        match token {
            Token::Open { raw, .. } => return has_class(raw, class),
            Token::Text(text) if text.trim().is_empty() => {}
            _ => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const BLOCK: &str = "<pre class=\"highlight rust\"><code>let x = 1;</code></pre>\n";

    #[test]
    fn test_wraps_highlighted_pre() {
        let out = wrap_code_blocks(BLOCK);
        assert!(out.starts_with("<div class=\"highlight js-code-highlight\">"));
        assert!(out.contains("<pre class=\"highlight rust\">"));
        assert!(out.trim_end().ends_with("</div>"));
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let once = wrap_code_blocks(BLOCK);
        assert_eq!(wrap_code_blocks(&once), once);
    }

    #[test]
    fn test_plain_pre_untouched() {
        let html = "<pre><code>x</code></pre>";
        assert_eq!(wrap_code_blocks(html), html);
    }

    #[test]
    fn test_panel_injected_once() {
        let wrapped = wrap_code_blocks(BLOCK);
        let once = add_panel_to_code_blocks(&wrapped);
        assert_eq!(once.matches("js-actions-panel").count(), 1);
        assert_eq!(add_panel_to_code_blocks(&once), once);
    }

    #[test]
    fn test_fullscreen_button_added_to_panel() {
        let html = add_fullscreen_button(&add_panel_to_code_blocks(&wrap_code_blocks(BLOCK)));
        assert_eq!(html.matches("js-fullscreen-code-action").count(), 1);
        assert_eq!(add_fullscreen_button(&html), html);
    }

    #[test]
    fn test_restores_raw_markers() {
        let html = "<code>{----% raw %----}x{----% endraw %----}</code>";
        assert_eq!(
            restore_raw_markers(html),
            "<code>{% raw %}x{% endraw %}</code>"
        );
    }
}

//! A small HTML tokenizer for the rewrite passes.
//!
//! The passes work on renderer output, not arbitrary web HTML: tags are
//! well-formed, attributes are quoted, and there is no CDATA. The tokenizer
//! splits that into open tags, close tags, text, and "other" markup
//! (comments, doctypes) without building a tree; passes that need ancestry
//! keep their own element stack.

/// One lexical piece of an HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// An open tag. `raw` is the full source including the angle brackets.
    Open {
        name: String,
        raw: &'a str,
        self_closing: bool,
    },
    /// A close tag.
    Close { name: String, raw: &'a str },
    /// Text between tags.
    Text(&'a str),
    /// Comments, doctypes, processing instructions.
    Other(&'a str),
}

impl Token<'_> {
    /// The raw source slice of this token.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Token::Open { raw, .. } | Token::Close { raw, .. } => raw,
            Token::Text(raw) | Token::Other(raw) => raw,
        }
    }
}

/// Elements that never take a close tag.
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

/// Split HTML into tokens. A stray `<` that opens no tag is kept as text.
#[must_use]
pub fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = html.as_bytes();
    let mut cursor = 0;

    while cursor < html.len() {
        let Some(rel) = html[cursor..].find('<') else {
            tokens.push(Token::Text(&html[cursor..]));
            break;
        };
        let lt = cursor + rel;
        if lt > cursor {
            tokens.push(Token::Text(&html[cursor..lt]));
        }

        if html[lt..].starts_with("<!--") {
            let end = html[lt..]
                .find("-->")
                .map_or(html.len(), |e| lt + e + 3);
            tokens.push(Token::Other(&html[lt..end]));
            cursor = end;
            continue;
        }

        let Some(gt) = find_tag_end(html, lt) else {
            tokens.push(Token::Text(&html[lt..]));
            break;
        };
        let raw = &html[lt..=gt];

        match bytes.get(lt + 1) {
            Some(b'!' | b'?') => tokens.push(Token::Other(raw)),
            Some(b'/') => tokens.push(Token::Close {
                name: tag_name(&raw[2..]),
                raw,
            }),
            Some(c) if c.is_ascii_alphabetic() => {
                let name = tag_name(&raw[1..]);
                tokens.push(Token::Open {
                    self_closing: raw.ends_with("/>") || is_void_element(&name),
                    name,
                    raw,
                });
            }
            _ => tokens.push(Token::Text(raw)),
        }
        cursor = gt + 1;
    }

    tokens
}

/// Index of the `>` terminating the tag opened at `lt`, honoring quotes.
fn find_tag_end(html: &str, lt: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, b) in html.as_bytes().iter().enumerate().skip(lt + 1) {
        match quote {
            Some(q) if *b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(*b),
                b'>' => return Some(i),
                _ => {}
            },
        }
    }
    None
}

fn tag_name(after_bracket: &str) -> String {
    after_bracket
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Value of an attribute inside a raw open tag.
#[must_use]
pub fn attr(raw_tag: &str, name: &str) -> Option<String> {
    let mut rest = raw_tag;
    loop {
        let pos = rest.find(name)?;
        let before_ok = pos == 0
            || (!rest.as_bytes()[pos - 1].is_ascii_alphanumeric()
                && rest.as_bytes()[pos - 1] != b'-');
        let after = &rest[pos + name.len()..];
        let after_trimmed = after.trim_start();
        if before_ok && after_trimmed.starts_with('=') {
            let value = after_trimmed[1..].trim_start();
            return Some(match value.as_bytes().first() {
                Some(&q @ (b'"' | b'\'')) => {
                    let inner = &value[1..];
                    inner[..inner.find(q as char)?].to_owned()
                }
                _ => value
                    .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
                    .next()
                    .unwrap_or("")
                    .to_owned(),
            });
        }
        rest = &rest[pos + name.len()..];
        if rest.is_empty() {
            return None;
        }
    }
}

/// Add a class to a raw open tag, creating the attribute if missing.
#[must_use]
pub fn add_class(raw_tag: &str, class: &str) -> String {
    if let Some(existing) = attr(raw_tag, "class") {
        if existing.split_whitespace().any(|c| c == class) {
            return raw_tag.to_owned();
        }
        let needle = format!("class=\"{existing}\"");
        if raw_tag.contains(&needle) {
            return raw_tag.replacen(&needle, &format!("class=\"{existing} {class}\""), 1);
        }
        let needle = format!("class='{existing}'");
        return raw_tag.replacen(&needle, &format!("class='{existing} {class}'"), 1);
    }

    let insert_at = raw_tag.len() - usize::from(raw_tag.ends_with("/>")) - 1;
    let mut out = String::with_capacity(raw_tag.len() + class.len() + 9);
    out.push_str(&raw_tag[..insert_at]);
    out.push_str(&format!(" class=\"{class}\""));
    out.push_str(&raw_tag[insert_at..]);
    out
}

/// True if the raw open tag carries the given class.
#[must_use]
pub fn has_class(raw_tag: &str, class: &str) -> bool {
    attr(raw_tag, "class").is_some_and(|c| c.split_whitespace().any(|x| x == class))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_tokenize_roundtrips() {
        let html = "<p>hi <em>there</em></p>\n<!-- note --><img src=\"/a.png\">";
        let rebuilt: String = tokenize(html).iter().map(Token::raw).collect();
        assert_eq!(rebuilt, html);
    }

    #[test]
    fn test_tokenize_classifies() {
        let tokens = tokenize("<p>x</p>");
        assert!(matches!(&tokens[0], Token::Open { name, .. } if name == "p"));
        assert!(matches!(&tokens[1], Token::Text("x")));
        assert!(matches!(&tokens[2], Token::Close { name, .. } if name == "p"));
    }

    #[test]
    fn test_void_element_is_self_closing() {
        let tokens = tokenize("<br>");
        assert!(matches!(&tokens[0], Token::Open { self_closing: true, .. }));
    }

    #[test]
    fn test_quoted_gt_does_not_end_tag() {
        let tokens = tokenize("<a title=\"a > b\">x</a>");
        assert!(matches!(&tokens[0], Token::Open { name, .. } if name == "a"));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_stray_lt_is_text() {
        let tokens = tokenize("1 < 2");
        assert_eq!(tokens, vec![Token::Text("1 "), Token::Text("< 2")]);
    }

    #[test]
    fn test_attr_lookup() {
        assert_eq!(
            attr("<img src=\"/pic.png\" alt='a b'>", "src").as_deref(),
            Some("/pic.png")
        );
        assert_eq!(attr("<img src=\"/pic.png\">", "alt"), None);
    }

    #[test]
    fn test_attr_ignores_prefixed_names() {
        assert_eq!(attr("<a data-href=\"x\">", "href"), None);
    }

    #[test]
    fn test_add_class_to_existing_attribute() {
        assert_eq!(
            add_class("<pre class=\"highlight\">", "js-code-highlight"),
            "<pre class=\"highlight js-code-highlight\">"
        );
    }

    #[test]
    fn test_add_class_creates_attribute() {
        assert_eq!(add_class("<table>", "wide"), "<table class=\"wide\">");
    }

    #[test]
    fn test_add_class_is_idempotent() {
        let tag = "<pre class=\"highlight js-code-highlight\">";
        assert_eq!(add_class(tag, "js-code-highlight"), tag);
    }

    #[test]
    fn test_has_class() {
        assert!(has_class("<div class=\"a b\">", "b"));
        assert!(!has_class("<div class=\"ab\">", "a"));
    }
}

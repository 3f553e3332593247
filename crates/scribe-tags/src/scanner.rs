//! Tokenizing of `{% %}` directive syntax.
//!
//! Splits content into literal text, raw-escaped stretches, directive
//! occurrences, and `{{ }}` variable occurrences. The scanner understands
//! the `{% raw %}`/`{% endraw %}` pair: everything between the markers is
//! one [`Segment::Raw`] and the markers themselves are consumed.

use crate::TagError;

/// One scanned piece of the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text outside any directive.
    Text(&'a str),
    /// Content between `{% raw %}` and `{% endraw %}`, markers excluded.
    Raw(&'a str),
    /// A `{% name args %}` directive occurrence.
    Tag {
        /// The directive name (validated lowercase identifier).
        name: &'a str,
        /// Everything after the name, trimmed.
        args: &'a str,
    },
    /// A `{{ ... }}` variable occurrence (always rejected downstream).
    Variable(&'a str),
}

/// Scan content into segments.
///
/// # Errors
///
/// Returns [`TagError::Syntax`] for unterminated `{%`/`{{`, an invalid
/// directive name, an unclosed `{% raw %}`, or a stray `{% endraw %}`.
pub fn scan(content: &str) -> Result<Vec<Segment<'_>>, TagError> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    while let Some((start, kind)) = next_opener(content, cursor) {
        if start > cursor {
            segments.push(Segment::Text(&content[cursor..start]));
        }

        match kind {
            Opener::Directive => {
                let close = find_close(content, start, "%}")?;
                let inner = content[start + 2..close].trim();
                let (name, args) = split_directive(inner)?;

                cursor = close + 2;
                match name {
                    "raw" => {
                        let (raw_end, after) = find_endraw(content, cursor)?;
                        segments.push(Segment::Raw(&content[cursor..raw_end]));
                        cursor = after;
                    }
                    "endraw" => {
                        return Err(TagError::Syntax(
                            "'{% endraw %}' without matching '{% raw %}'".to_owned(),
                        ));
                    }
                    _ => segments.push(Segment::Tag { name, args }),
                }
            }
            Opener::Variable => {
                let close = find_close(content, start, "}}")?;
                segments.push(Segment::Variable(content[start + 2..close].trim()));
                cursor = close + 2;
            }
        }
    }

    if cursor < content.len() {
        segments.push(Segment::Text(&content[cursor..]));
    }

    Ok(segments)
}

#[derive(Clone, Copy)]
enum Opener {
    Directive,
    Variable,
}

/// Find the earliest `{%` or `{{` at or after `from`.
fn next_opener(content: &str, from: usize) -> Option<(usize, Opener)> {
    let rest = &content[from..];
    let directive = rest.find("{%");
    let variable = rest.find("{{");

    match (directive, variable) {
        (Some(d), Some(v)) if v < d => Some((from + v, Opener::Variable)),
        (Some(d), _) => Some((from + d, Opener::Directive)),
        (None, Some(v)) => Some((from + v, Opener::Variable)),
        (None, None) => None,
    }
}

fn find_close(content: &str, start: usize, close: &str) -> Result<usize, TagError> {
    content[start + 2..].find(close).map_or_else(
        || {
            Err(TagError::Syntax(format!(
                "'{}' was not properly terminated",
                &content[start..start + 2]
            )))
        },
        |rel| Ok(start + 2 + rel),
    )
}

/// Split directive text into its name and argument string.
fn split_directive(inner: &str) -> Result<(&str, &str), TagError> {
    let name = inner.split_whitespace().next().unwrap_or("");
    if name.is_empty() || !is_valid_tag_name(name) {
        return Err(TagError::Syntax(format!(
            "invalid directive name in '{{% {inner} %}}'"
        )));
    }
    let args = inner[name.len()..].trim();
    Ok((name, args))
}

/// Tag names are bare lowercase identifiers.
fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Locate the `{% endraw %}` matching an open raw marker.
///
/// Returns `(raw_content_end, position_after_endraw)`.
fn find_endraw(content: &str, from: usize) -> Result<(usize, usize), TagError> {
    let mut search = from;
    while let Some(rel) = content[search..].find("{%") {
        let start = search + rel;
        let close = find_close(content, start, "%}")?;
        if content[start + 2..close].trim() == "endraw" {
            return Ok((start, close + 2));
        }
        search = close + 2;
    }
    Err(TagError::Syntax(
        "'{% raw %}' was never closed".to_owned(),
    ))
}

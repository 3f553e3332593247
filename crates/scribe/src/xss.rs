//! Pre-render XSS gate.
//!
//! A cheap regex screen over the raw markdown, run before anything else.
//! It only catches the `data:` URI payloads the sanitizer cannot be trusted
//! to neutralize once they survive two markdown passes; the allow-list
//! sanitizer remains the main defense.

use std::sync::LazyLock;

use regex::Regex;

use crate::RenderError;

static SRC_DATA_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)src=["'](data|&)"#).expect("static pattern"));
static DATA_TEXT_HTML: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)data:text/html[,;][\sa-z0-9]*").expect("static pattern"));

/// Reject content containing a known-bad payload.
///
/// # Errors
///
/// [`RenderError::XssDetected`] carrying the matched fragment.
pub fn scan(content: &str) -> Result<(), RenderError> {
    for pattern in [&SRC_DATA_URI, &DATA_TEXT_HTML] {
        if let Some(found) = pattern.find(content) {
            tracing::warn!(fragment = found.as_str(), "rejecting content at XSS gate");
            return Err(RenderError::XssDetected(found.as_str().to_owned()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_src_data_uri() {
        assert!(scan(r#"<img src="data:image/png;base64,x">"#).is_err());
    }

    #[test]
    fn test_rejects_entity_obfuscated_src() {
        assert!(scan(r#"<img src="&#100;ata:text/html">"#).is_err());
    }

    #[test]
    fn test_rejects_data_text_html() {
        assert!(scan("<a href=\"data:text/html;base64 yikes\">x</a>").is_err());
    }

    #[test]
    fn test_allows_quoted_mime_type_mention() {
        // The literal string with no payload separator is fine.
        assert!(scan("the 'data:text/html' scheme is dangerous").is_ok());
    }

    #[test]
    fn test_allows_ordinary_images() {
        assert!(scan("<img src=\"https://cdn.example/pic.png\">").is_ok());
    }

    #[test]
    fn test_case_insensitive() {
        assert!(scan(r#"<img SRC="DATA:text/html,alert(1)">"#).is_err());
    }
}

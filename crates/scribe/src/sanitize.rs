//! Allow-list HTML sanitization between the first markdown pass and
//! directive expansion.
//!
//! Everything user-authored goes through here; fragments injected later by
//! directive handlers are trusted library output and are not re-filtered.

use std::sync::LazyLock;

use ammonia::Builder;

static SANITIZER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::default();
    // Highlighting and rewrite passes key off classes on code-ish
    // containers; classes anywhere else are dropped.
    builder
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("pre", &["class"])
        .add_tag_attributes("span", &["class"])
        .add_tag_attributes("div", &["class"]);
    builder
});

/// Filter rendered HTML down to the allow-list.
#[must_use]
pub fn sanitize(html: &str) -> String {
    SANITIZER.clean(html).to_string()
}

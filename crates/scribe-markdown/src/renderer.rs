//! Markdown-to-HTML rendering via a pulldown-cmark event loop.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Markdown renderer for community content.
///
/// Renders CommonMark plus tables and strikethrough. Soft line breaks become
/// `<br>` when hard-wrap is enabled (the default, matching how community
/// posts treat single newlines). Raw HTML is passed through untouched; the
/// caller is expected to run an allow-list sanitizer over the output.
///
/// The renderer runs twice in the full content pipeline: once before
/// directive expansion and once after, so markdown emitted by a directive
/// fragment (e.g. a caption) is also rendered.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    hard_wrap: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with hard-wrap enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { hard_wrap: true }
    }

    /// Enable or disable rendering soft breaks as `<br>`.
    #[must_use]
    pub fn with_hard_wrap(mut self, enabled: bool) -> Self {
        self.hard_wrap = enabled;
        self
    }

    /// Parser options: tables and strikethrough.
    #[must_use]
    pub fn parser_options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
    }

    /// Render markdown to an HTML string.
    #[must_use]
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Self::parser_options());
        let mut writer = HtmlWriter::new(self.hard_wrap, markdown.len());
        for event in parser {
            writer.event(event);
        }
        writer.finish()
    }
}

/// Escape text for inclusion in HTML content or attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Accumulates the body of a fenced or indented code block.
struct CodeBuffer {
    language: String,
    body: String,
}

struct HtmlWriter {
    out: String,
    hard_wrap: bool,
    code: Option<CodeBuffer>,
    /// Alt text being captured between image start/end events.
    image_alt: Option<String>,
    /// `(src, title)` of the image whose alt text is being captured.
    pending_image: Option<(String, String)>,
    table_in_head: bool,
}

impl HtmlWriter {
    fn new(hard_wrap: bool, capacity_hint: usize) -> Self {
        Self {
            out: String::with_capacity(capacity_hint + capacity_hint / 2),
            hard_wrap,
            code: None,
            image_alt: None,
            pending_image: None,
            table_in_head: false,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.push(&html),
            Event::SoftBreak => {
                if self.hard_wrap {
                    self.push("<br>\n");
                } else {
                    self.push("\n");
                }
            }
            Event::HardBreak => self.push("<br>\n"),
            Event::Rule => self.push("<hr>\n"),
            Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {
                // Not enabled in parser options.
            }
        }
    }

    /// Push inline output, diverting to the alt buffer inside an image.
    fn push(&mut self, content: &str) {
        if let Some(alt) = &mut self.image_alt {
            alt.push_str(content);
        } else {
            self.out.push_str(content);
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = &mut self.code {
            code.body.push_str(text);
        } else if let Some(alt) = &mut self.image_alt {
            alt.push_str(text);
        } else {
            let escaped = escape_html(text);
            self.out.push_str(&escaped);
        }
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(alt) = &mut self.image_alt {
            alt.push_str(code);
            return;
        }
        let _ = write!(self.out, "<code>{}</code>", escape_html(code));
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.push("<p>"),
            Tag::Heading { level, .. } => {
                let _ = write!(self.out, "<{level}>");
            }
            Tag::BlockQuote(_) => self.push("<blockquote>\n"),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => code_language(&info),
                    CodeBlockKind::Indented => "plaintext".to_owned(),
                };
                self.code = Some(CodeBuffer {
                    language,
                    body: String::new(),
                });
            }
            Tag::List(Some(1)) => self.push("<ol>\n"),
            Tag::List(Some(start)) => {
                let _ = write!(self.out, "<ol start=\"{start}\">\n");
            }
            Tag::List(None) => self.push("<ul>\n"),
            Tag::Item => self.push("<li>"),
            Tag::Table(_) => self.push("<table>\n"),
            Tag::TableHead => {
                self.table_in_head = true;
                self.push("<thead>\n<tr>");
            }
            Tag::TableRow => self.push("<tr>"),
            Tag::TableCell => {
                if self.table_in_head {
                    self.push("<th>");
                } else {
                    self.push("<td>");
                }
            }
            Tag::Emphasis => self.push("<em>"),
            Tag::Strong => self.push("<strong>"),
            Tag::Strikethrough => self.push("<del>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                if title.is_empty() {
                    let _ = write!(self.out, "<a href=\"{}\">", escape_html(&dest_url));
                } else {
                    let _ = write!(
                        self.out,
                        "<a href=\"{}\" title=\"{}\">",
                        escape_html(&dest_url),
                        escape_html(&title)
                    );
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.pending_image = Some((dest_url.into_string(), title.into_string()));
                self.image_alt = Some(String::new());
            }
            Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.push("</p>\n"),
            TagEnd::Heading(level) => {
                let _ = write!(self.out, "</{level}>\n");
            }
            TagEnd::BlockQuote(_) => self.push("</blockquote>\n"),
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    let _ = write!(
                        self.out,
                        "<pre class=\"highlight {}\"><code>{}</code></pre>\n",
                        escape_html(&code.language),
                        escape_html(&code.body)
                    );
                }
            }
            TagEnd::List(true) => self.push("</ol>\n"),
            TagEnd::List(false) => self.push("</ul>\n"),
            TagEnd::Item => self.push("</li>\n"),
            TagEnd::Table => self.push("</tbody>\n</table>\n"),
            TagEnd::TableHead => {
                self.table_in_head = false;
                self.push("</tr>\n</thead>\n<tbody>\n");
            }
            TagEnd::TableRow => self.push("</tr>\n"),
            TagEnd::TableCell => {
                if self.table_in_head {
                    self.push("</th>");
                } else {
                    self.push("</td>");
                }
            }
            TagEnd::Emphasis => self.push("</em>"),
            TagEnd::Strong => self.push("</strong>"),
            TagEnd::Strikethrough => self.push("</del>"),
            TagEnd::Link => self.push("</a>"),
            TagEnd::Image => {
                let alt = self.image_alt.take().unwrap_or_default();
                if let Some((src, title)) = self.pending_image.take() {
                    if title.is_empty() {
                        let _ = write!(
                            self.out,
                            "<img src=\"{}\" alt=\"{}\">",
                            escape_html(&src),
                            escape_html(&alt)
                        );
                    } else {
                        let _ = write!(
                            self.out,
                            "<img src=\"{}\" alt=\"{}\" title=\"{}\">",
                            escape_html(&src),
                            escape_html(&alt),
                            escape_html(&title)
                        );
                    }
                }
            }
            TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::Superscript
            | TagEnd::Subscript => {}
        }
    }
}

/// Extract the language hint from a fence info string.
///
/// The hint is the first whitespace-delimited token, lowercased. Blank info
/// defaults to `plaintext` so the highlight class is always present.
fn code_language(info: &str) -> String {
    info.split_whitespace()
        .next()
        .map_or_else(|| "plaintext".to_owned(), str::to_lowercase)
}

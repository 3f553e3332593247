//! `{% wikipedia %}` excerpt embed.
//!
//! Fetches an article summary (or a single section, when the URL carries an
//! anchor) from the Wikipedia REST API and renders it as a quoted excerpt
//! linking back to the article.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Deserialize;
use ureq::Agent;

use crate::handlers::strip_tags;
use crate::{TagContext, TagError, TagHandler};

static ARTICLE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([a-z-]+)\.wikipedia\.org/wiki/(\S+)$").expect("static pattern")
});

// Chrome, navboxes, references, images: none of them read well in an
// excerpt.
static CLEANUP_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<figure[^>]*>.*?</figure>|<sup[^>]*>.*?</sup>|<span[^>]*class="[^"]*mw-ref[^"]*"[^>]*>.*?</span>|<div[^>]*class="[^"]*(?:noprint|hatnote)[^"]*"[^>]*>.*?</div>"#,
    )
    .expect("static pattern")
});
static ANCHOR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a\b[^>]*>(.*?)</a>").expect("static pattern"));

/// Parsed pieces of a Wikipedia article URL.
#[derive(Debug, PartialEq, Eq)]
struct ArticleRef<'a> {
    lang: &'a str,
    title: &'a str,
    anchor: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    title: String,
    extract_html: String,
}

#[derive(Debug, Deserialize)]
struct SectionsResponse {
    lead: LeadSection,
    remaining: RemainingSections,
}

#[derive(Debug, Deserialize)]
struct LeadSection {
    normalizedtitle: String,
}

#[derive(Debug, Deserialize)]
struct RemainingSections {
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(default)]
    anchor: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    line: Option<String>,
}

/// Embeds a Wikipedia article or section excerpt.
pub struct WikipediaTag {
    agent: Agent,
}

impl WikipediaTag {
    #[must_use]
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    fn parse_article_url(url: &str) -> Result<ArticleRef<'_>, TagError> {
        let caps = ARTICLE_URL.captures(url).ok_or_else(|| {
            TagError::invalid("wikipedia", format!("invalid article URL: '{url}'"))
        })?;

        let lang = caps.get(1).map_or("", |m| m.as_str());
        let path = caps.get(2).map_or("", |m| m.as_str());
        let (title, anchor) = match path.split_once('#') {
            Some((title, anchor)) => (title, Some(anchor)),
            None => (path, None),
        };
        Ok(ArticleRef { lang, title, anchor })
    }

    fn fetch_json<T: serde::de::DeserializeOwned>(&self, api_url: &str) -> Result<T, TagError> {
        let response = self
            .agent
            .get(api_url)
            .call()
            .map_err(|e| TagError::Upstream {
                tag: "wikipedia",
                detail: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status != 200 {
            let detail = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(TagError::Upstream {
                tag: "wikipedia",
                detail: format!("HTTP {status}: {detail}"),
            });
        }

        body.read_json().map_err(|e| TagError::Upstream {
            tag: "wikipedia",
            detail: e.to_string(),
        })
    }

    fn fetch_summary(&self, article: &ArticleRef<'_>) -> Result<(String, String), TagError> {
        let api_url = format!(
            "https://{}.wikipedia.org/api/rest_v1/page/summary/{}",
            article.lang, article.title
        );
        let summary: SummaryResponse = self.fetch_json(&api_url)?;
        Ok((summary.title, summary.extract_html))
    }

    fn fetch_section(
        &self,
        article: &ArticleRef<'_>,
        anchor: &str,
    ) -> Result<(String, String), TagError> {
        let api_url = format!(
            "https://{}.wikipedia.org/api/rest_v1/page/mobile-sections/{}",
            article.lang, article.title
        );
        let sections: SectionsResponse = self.fetch_json(&api_url)?;

        let wanted = percent_decode_str(anchor).decode_utf8_lossy();
        let section = sections
            .remaining
            .sections
            .iter()
            .find(|s| s.anchor.as_deref() == Some(wanted.as_ref()))
            .ok_or_else(|| {
                TagError::invalid("wikipedia", format!("section '{wanted}' not found"))
            })?;

        let line = section.line.clone().unwrap_or_default();
        let text = section.text.clone().unwrap_or_default();
        let title = format!("{} - {line}", sections.lead.normalizedtitle);
        Ok((title, clean_extract(&text)))
    }
}

/// Strip figures, reference markers, and hatnotes; flatten links to text.
fn clean_extract(html: &str) -> String {
    let without_blocks = CLEANUP_BLOCK.replace_all(html, "");
    ANCHOR_TAG.replace_all(&without_blocks, "$1").into_owned()
}

impl TagHandler for WikipediaTag {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    fn url_pattern(&self) -> Option<&Regex> {
        Some(&ARTICLE_URL)
    }

    fn render(&self, args: &str, _ctx: &TagContext) -> Result<String, TagError> {
        let stripped = strip_tags(args);
        let url = stripped.trim();
        let article = Self::parse_article_url(url)?;

        let (title, extract) = match article.anchor {
            Some(anchor) => self.fetch_section(&article, anchor)?,
            None => self.fetch_summary(&article)?,
        };

        Ok(format!(
            "<div class=\"media-wikipedia\">\n\
             <a href=\"{url}\"><h2>{}</h2></a>\n\
             <div class=\"media-wikipedia__extract\">{extract}</div>\n\
             </div>\n",
            scribe_markdown::escape_html(&title)
        ))
    }
}

//! Content extraction from HTML pages
//!
//! The extraction algorithm is a pluggable boundary: the orchestrator only
//! depends on the [`ContentExtractor`] trait. The bundled [`DomExtractor`]
//! pulls title, body text, and metadata out of the DOM with scraper; a
//! deployment can swap in a heavier readability engine without touching the
//! crawl pipeline.

use scraper::{ElementRef, Html, Selector};

/// Extractions shorter than this are treated as failed
pub const MIN_TEXT_LENGTH: usize = 50;

/// Readable content extracted from a web page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
    pub language: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

/// Boundary trait for HTML-to-text extraction
pub trait ContentExtractor: Send + Sync {
    /// Extracts readable content from HTML
    ///
    /// Returns `None` on empty input or when the extraction is too short to
    /// be useful (below [`MIN_TEXT_LENGTH`]).
    fn extract(&self, html: &str, url: &str) -> Option<ExtractedContent>;
}

/// DOM-based extractor using scraper
///
/// Title comes from `<title>` with an `og:title` fallback; language from the
/// `<html lang>` attribute (primary subtag); author and date from the usual
/// meta tags. Body text skips script, style, and other non-content elements.
#[derive(Debug, Default)]
pub struct DomExtractor;

impl DomExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ContentExtractor for DomExtractor {
    fn extract(&self, html: &str, url: &str) -> Option<ExtractedContent> {
        if html.trim().is_empty() {
            return None;
        }

        let document = Html::parse_document(html);

        let title = select_text(&document, "title")
            .or_else(|| select_meta(&document, r#"meta[property="og:title"]"#));

        let language = document
            .root_element()
            .value()
            .attr("lang")
            .map(primary_subtag)
            .filter(|lang| !lang.is_empty());

        let author = select_meta(&document, r#"meta[name="author"]"#);
        let date = select_meta(&document, r#"meta[property="article:published_time"]"#)
            .or_else(|| select_meta(&document, r#"meta[name="date"]"#));

        let text = body_text(&document);
        if text.len() < MIN_TEXT_LENGTH {
            return None;
        }

        Some(ExtractedContent {
            url: url.to_string(),
            title,
            text,
            language,
            author,
            date,
        })
    }
}

/// Returns the trimmed text of the first element matching the selector
fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Returns the content attribute of the first element matching the selector
fn select_meta(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects visible text from the document body
fn body_text(document: &Html) -> String {
    let mut text = String::new();
    if let Ok(selector) = Selector::parse("body") {
        if let Some(body) = document.select(&selector).next() {
            push_text(body, &mut text);
        }
    }
    text
}

fn push_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(fragment) = child.value().as_text() {
            let trimmed = fragment.trim();
            if !trimmed.is_empty() {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(trimmed);
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            match child_element.value().name() {
                "script" | "style" | "noscript" | "template" => continue,
                _ => push_text(child_element, out),
            }
        }
    }
}

/// Reduces a BCP 47 tag to its primary subtag ("en-GB" -> "en")
fn primary_subtag(lang: &str) -> String {
    lang.split('-').next().unwrap_or(lang).to_lowercase()
}

//! Page content extraction.
//!
//! Pure functions over an already-fetched body; nothing here fails. Absent
//! or empty fields degrade to the documented defaults.
//!
//! Attribute matching is deliberately loose: a meta tag counts as a
//! description tag when its `name` merely contains "description", case
//! ignored, and only the first such tag is consulted even if its content
//! turns out to be empty.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Title fallback.
pub const NO_TITLE: &str = "No title found";
/// Meta description fallback.
pub const NO_DESCRIPTION: &str = "No description found";
/// Favicon fallback.
pub const NO_FAVICON: &str = "No favicon found";
/// Creator fallback; the WHOIS organization may replace it later.
pub const UNKNOWN_CREATOR: &str = "Unknown";

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("Invalid title selector"));
static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("Invalid meta selector"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link").expect("Invalid link selector"));
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("Invalid img selector"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("Invalid word regex"));

/// Page facts extracted from markup alone, before link classification and
/// the availability probes are folded in.
#[derive(Debug, Clone, PartialEq)]
pub struct PageExtract {
    /// Title text, trimmed, or [`NO_TITLE`].
    pub title: String,
    /// First description meta content, or [`NO_DESCRIPTION`].
    pub description: String,
    /// First icon link href, or [`NO_FAVICON`].
    pub favicon: String,
    /// Author meta, else og:site_name, else [`UNKNOWN_CREATOR`].
    pub creator: String,
    /// `<img>` elements with a non-empty `src`.
    pub image_count: usize,
    /// Word-character runs in the document text.
    pub word_count: usize,
}

/// Extracts the page facts from a fetched body.
pub fn summarize_page(body: &str) -> PageExtract {
    let document = Html::parse_document(body);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let description = meta_content(&document, "name", "description")
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    let creator = meta_content(&document, "name", "author")
        .or_else(|| meta_content(&document, "property", "og:site_name"))
        .unwrap_or_else(|| UNKNOWN_CREATOR.to_string());

    let favicon = document
        .select(&LINK_SELECTOR)
        .find(|el| attr_contains(el, "rel", "icon"))
        .and_then(|el| el.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NO_FAVICON.to_string());

    let image_count = document
        .select(&IMG_SELECTOR)
        .filter(|el| el.value().attr("src").is_some_and(|src| !src.is_empty()))
        .count();

    // Text nodes concatenate with no separator between them, so a word
    // split only by an element boundary counts as one run.
    let text = document.root_element().text().collect::<String>();
    let word_count = WORD_RE.find_iter(&text).count();

    PageExtract {
        title,
        description,
        favicon,
        creator,
        image_count,
        word_count,
    }
}

/// Content of the first `<meta>` whose attribute contains `needle`.
///
/// Returns `None` when no tag matches or when the first matching tag has no
/// non-empty content; later matching tags are never consulted.
fn meta_content(document: &Html, attr: &str, needle: &str) -> Option<String> {
    document
        .select(&META_SELECTOR)
        .find(|el| attr_contains(el, attr, needle))
        .and_then(|el| el.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

fn attr_contains(element: &ElementRef<'_>, attr: &str, needle: &str) -> bool {
    element
        .value()
        .attr(attr)
        .is_some_and(|value| value.to_ascii_lowercase().contains(needle))
}

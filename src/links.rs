//! Link discovery and internal/external classification.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::models::LinkSet;
use crate::target::NormalizedTarget;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("Invalid anchor selector"));

/// Classifies every `<a href>` in the document against the target host.
///
/// Absolute http(s) links are compared by exact host equality. Relative
/// references are resolved by plain concatenation onto the target URL
/// string, never by RFC 3986 resolution; `../` and query-only references can
/// therefore come out malformed. That is the documented behavior, kept so
/// the counts and values match what the original analysis produced.
/// Absolute links whose host cannot be extracted are skipped.
pub fn classify_links(body: &str, target: &NormalizedTarget) -> LinkSet {
    let document = Html::parse_document(body);
    let mut links = LinkSet::default();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.is_empty() {
            continue;
        }

        if href.starts_with("http://") || href.starts_with("https://") {
            let Ok(parsed) = Url::parse(href) else {
                continue;
            };
            match parsed.host_str() {
                Some(host) if host == target.host() => links.internal.push(href.to_string()),
                Some(_) => links.external.push(href.to_string()),
                None => {}
            }
        } else if href.starts_with('/') {
            links.internal.push(format!("{}{}", target.as_str(), href));
        } else {
            links.internal.push(format!("{}/{}", target.as_str(), href));
        }
    }

    links
}

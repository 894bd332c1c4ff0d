//! Textual identity fields from the rendered markup.
//!
//! A pure, synchronous pass over captured HTML using the `scraper` crate.
//! Every field degrades to a default instead of failing; `brand` in
//! particular is guaranteed non-empty.

use crate::report::PageMeta;
use scraper::{Html, Selector};
use url::Url;

/// A title-derived brand candidate longer than this falls through to the
/// host-name fallback.
const MAX_BRAND_LEN: usize = 20;

/// Title separators tried in order; the left segment of the first hit wins.
const TITLE_SEPARATORS: [&str; 3] = [" | ", " - ", ": "];

/// Read title, brand, description, and keywords from rendered HTML.
///
/// `request_url` is the URL the caller asked for; its host feeds the brand
/// fallback chain.
pub fn read(html: &str, request_url: &Url) -> PageMeta {
    let document = Html::parse_document(html);

    let title = title_of(&document);
    let description = meta_content(&document, r#"meta[name="description"]"#)
        .or_else(|| meta_content(&document, r#"meta[property="og:description"]"#));
    let keywords = meta_content(&document, r#"meta[name="keywords"]"#);
    let brand = brand_of(&document, &title, request_url);

    PageMeta {
        title,
        brand,
        description,
        keywords,
    }
}

fn title_of(document: &Html) -> String {
    let sel = Selector::parse("title").unwrap();
    if let Some(el) = document.select(&sel).next() {
        let text = el.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            return text;
        }
    }
    meta_content(document, r#"meta[property="og:title"]"#).unwrap_or_default()
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).unwrap();
    document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Brand resolution order: explicit site-name meta tag, then the left
/// segment of the title, then the capitalized host label, then `"Site"`.
fn brand_of(document: &Html, title: &str, request_url: &Url) -> String {
    if let Some(site_name) = meta_content(document, r#"meta[property="og:site_name"]"#) {
        return site_name;
    }

    if let Some(candidate) = brand_from_title(title) {
        return candidate;
    }

    brand_from_host(request_url).unwrap_or_else(|| "Site".to_string())
}

fn brand_from_title(title: &str) -> Option<String> {
    let candidate = TITLE_SEPARATORS
        .iter()
        .find_map(|&sep| title.split_once(sep).map(|(left, _)| left))
        .unwrap_or(title)
        .trim();

    if candidate.is_empty() || candidate.len() > MAX_BRAND_LEN {
        return None;
    }
    Some(candidate.to_string())
}

fn brand_from_host(request_url: &Url) -> Option<String> {
    let host = request_url.host_str()?;
    let label = host
        .strip_prefix("www.")
        .unwrap_or(host)
        .split('.')
        .next()
        .filter(|l| !l.is_empty())?;

    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().collect::<String>() + chars.as_str())
}

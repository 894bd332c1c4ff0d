//! Candidate content-image and favicon collection.
//!
//! The in-page script snapshots raw `<img>` attributes and computed
//! background images; everything that involves judgement (`srcset`
//! ranking, filtering, resolution, deduplication) happens here so it can
//! be tested without a renderer.

use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::HashSet;
use url::Url;

/// Hard cap on the `images` list, applied after deduplication.
pub const MAX_IMAGES: usize = 50;

/// Snapshots every `<img>` and every computed `background-image` url.
pub const ASSET_SNAPSHOT_JS: &str = r#"
(() => {
  const images = Array.from(document.querySelectorAll('img')).map((img) => ({
    current: img.currentSrc || null,
    src: img.getAttribute('src'),
    data_src: img.getAttribute('data-src'),
    srcset: img.getAttribute('srcset'),
  }));
  const backgrounds = [];
  for (const el of document.querySelectorAll('*')) {
    const bg = window.getComputedStyle(el).backgroundImage;
    if (bg && bg !== 'none') {
      const m = bg.match(/url\(["']?([^"')]+)["']?\)/);
      if (m) backgrounds.push(m[1]);
    }
  }
  return { images, backgrounds };
})()
"#;

/// Raw attributes of one `<img>` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageElementSnapshot {
    /// The browser's currently-resolved source, when any.
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub data_src: Option<String>,
    #[serde(default)]
    pub srcset: Option<String>,
}

/// Everything the asset snapshot script returns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetSnapshot {
    #[serde(default)]
    pub images: Vec<ImageElementSnapshot>,
    #[serde(default)]
    pub backgrounds: Vec<String>,
}

/// One `srcset` variant while ranking; discarded once a winner is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCandidate {
    pub url: String,
    pub width: Option<u32>,
}

/// Parse a `srcset` attribute into its variants.
///
/// Only `<width>w` descriptors carry a width; density descriptors (`2x`)
/// parse as width-less variants.
pub fn parse_srcset(srcset: &str) -> Vec<ImageCandidate> {
    srcset
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split_whitespace();
            let url = parts.next()?.to_string();
            let width = parts
                .next()
                .and_then(|d| d.strip_suffix('w'))
                .and_then(|d| d.parse().ok());
            Some(ImageCandidate { url, width })
        })
        .collect()
}

/// Pick the variant with the largest declared width; ties go to the
/// first-listed variant. `None` when no variant declares a width.
pub fn pick_srcset_variant(srcset: &str) -> Option<String> {
    let mut best: Option<ImageCandidate> = None;
    for candidate in parse_srcset(srcset) {
        let Some(width) = candidate.width else { continue };
        let leader = best.as_ref().and_then(|b| b.width);
        if leader.map_or(true, |w| width > w) {
            best = Some(candidate);
        }
    }
    best.map(|c| c.url)
}

/// The source one `<img>` contributes: the widest `srcset` variant when one
/// is declared, else currently-resolved source, then `src`, then the
/// lazy-load data attribute.
pub fn element_source(snap: &ImageElementSnapshot) -> Option<String> {
    if let Some(srcset) = snap.srcset.as_deref() {
        if let Some(url) = pick_srcset_variant(srcset) {
            return Some(url);
        }
    }
    [&snap.current, &snap.src, &snap.data_src]
        .into_iter()
        .find_map(|s| s.clone().filter(|s| !s.trim().is_empty()))
}

/// A candidate is kept only if it is not a `data:` URI and is resolvable
/// against the page (absolute, protocol-relative, or root-relative).
pub fn is_resolvable(candidate: &str) -> bool {
    !candidate.starts_with("data:")
        && (candidate.starts_with("http") || candidate.starts_with("//") || candidate.starts_with('/'))
}

/// Collect the final image list: select per-element sources, filter,
/// resolve against `base`, drop accidental `data:` results, deduplicate in
/// stable order, cap at [`MAX_IMAGES`].
pub fn collect_images(snapshot: &AssetSnapshot, base: &Url) -> Vec<String> {
    let sources = snapshot
        .images
        .iter()
        .filter_map(element_source)
        .chain(snapshot.backgrounds.iter().cloned());

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for candidate in sources {
        if !is_resolvable(&candidate) {
            continue;
        }
        let resolved = resolve_or_raw(&candidate, base);
        if resolved.starts_with("data:") {
            continue;
        }
        if seen.insert(resolved.clone()) {
            out.push(resolved);
        }
        if out.len() == MAX_IMAGES {
            break;
        }
    }
    out
}

/// Resolve `candidate` against `base`; a failed resolution keeps the raw
/// string rather than dropping the asset.
pub fn resolve_or_raw(candidate: &str, base: &Url) -> String {
    base.join(candidate)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| candidate.to_string())
}

/// Favicon hrefs from `link[rel*="icon"]`, resolved absolute.
///
/// Unlike content images, entries that fail to resolve are dropped.
pub fn collect_favicons(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let sel = Selector::parse(r#"link[rel*="icon"]"#).unwrap();

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for el in document.select(&sel) {
        let Some(href) = el.value().attr("href") else { continue };
        let Ok(resolved) = base.join(href) else { continue };
        let resolved = resolved.to_string();
        if seen.insert(resolved.clone()) {
            out.push(resolved);
        }
    }
    out
}

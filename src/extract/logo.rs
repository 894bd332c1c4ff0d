//! Best-guess logo identification.
//!
//! The in-page script snapshots every image and inline-SVG element in
//! document order; scoring happens here against a declarative rubric so the
//! heuristics are testable without a renderer. Inline SVG is serialized to
//! a `data:image/svg+xml` URI by the script, which deliberately survives
//! the winner's URL-resolution step unchanged.

use serde::Deserialize;
use url::Url;

/// Candidates smaller than this on either axis are ignored.
const MIN_DIMENSION: f64 = 20.0;

/// Top-left quadrant bounds for the placement signal.
const QUADRANT_TOP: f64 = 150.0;
const QUADRANT_LEFT: f64 = 500.0;

/// Snapshots the logo candidate pool. Runs after the capture stage has
/// scrolled back to the top, so bounding boxes are page-top relative.
pub const LOGO_SNAPSHOT_JS: &str = r#"
(() => {
  const out = [];
  for (const el of document.querySelectorAll('img, svg')) {
    const rect = el.getBoundingClientRect();
    const anchor = el.closest('a[href]');
    let src = null;
    if (el.tagName.toLowerCase() === 'img') {
      src = el.currentSrc || el.getAttribute('src') || el.getAttribute('data-src');
    } else {
      src = 'data:image/svg+xml;utf8,' + encodeURIComponent(el.outerHTML);
    }
    out.push({
      src: src,
      class: el.getAttribute('class') || '',
      id: el.getAttribute('id') || '',
      alt: el.getAttribute('alt') || '',
      top: rect.top,
      left: rect.left,
      width: rect.width,
      height: rect.height,
      link_href: anchor ? anchor.getAttribute('href') : null,
    });
  }
  return out;
})()
"#;

/// Everything the rubric needs to know about one candidate element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoElementSnapshot {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default, rename = "class")]
    pub class_attr: String,
    #[serde(default, rename = "id")]
    pub id_attr: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub link_href: Option<String>,
}

/// Page-level context the rubric scores against.
#[derive(Debug, Clone)]
pub struct RubricContext {
    /// Ascii origin of the page, e.g. `https://example.com`.
    pub origin: String,
}

impl RubricContext {
    pub fn for_page(page_url: &Url) -> Self {
        Self {
            origin: page_url.origin().ascii_serialization(),
        }
    }
}

/// One additive scoring signal.
pub struct ScoreRule {
    pub name: &'static str,
    pub weight: i32,
    pub matches: fn(&LogoElementSnapshot, &RubricContext) -> bool,
}

/// The rubric, as data. Signals are independent and additive.
pub const LOGO_RUBRIC: &[ScoreRule] = &[
    ScoreRule {
        name: "filename-contains-logo",
        weight: 5,
        matches: rule_filename,
    },
    ScoreRule {
        name: "class-contains-logo",
        weight: 3,
        matches: rule_class,
    },
    ScoreRule {
        name: "id-contains-logo",
        weight: 3,
        matches: rule_id,
    },
    ScoreRule {
        name: "alt-contains-logo",
        weight: 3,
        matches: rule_alt,
    },
    ScoreRule {
        name: "top-left-placement",
        weight: 5,
        matches: rule_placement,
    },
    ScoreRule {
        name: "wrapped-in-root-link",
        weight: 3,
        matches: rule_root_link,
    },
];

fn rule_filename(el: &LogoElementSnapshot, _ctx: &RubricContext) -> bool {
    el.src
        .as_deref()
        .map(filename_of)
        .is_some_and(|name| name.to_lowercase().contains("logo"))
}

fn rule_class(el: &LogoElementSnapshot, _ctx: &RubricContext) -> bool {
    el.class_attr.to_lowercase().contains("logo")
}

fn rule_id(el: &LogoElementSnapshot, _ctx: &RubricContext) -> bool {
    el.id_attr.to_lowercase().contains("logo")
}

fn rule_alt(el: &LogoElementSnapshot, _ctx: &RubricContext) -> bool {
    el.alt.to_lowercase().contains("logo")
}

fn rule_placement(el: &LogoElementSnapshot, _ctx: &RubricContext) -> bool {
    el.top < QUADRANT_TOP && el.left < QUADRANT_LEFT
}

fn rule_root_link(el: &LogoElementSnapshot, ctx: &RubricContext) -> bool {
    let Some(href) = el.link_href.as_deref() else {
        return false;
    };
    let href = href.trim();
    href == "/" || href.trim_end_matches('/') == ctx.origin.trim_end_matches('/')
}

/// Last path segment of a URL, query and fragment stripped.
fn filename_of(src: &str) -> &str {
    src.split(['?', '#'])
        .next()
        .unwrap_or(src)
        .rsplit('/')
        .next()
        .unwrap_or(src)
}

/// Total rubric score for one candidate.
pub fn score(el: &LogoElementSnapshot, ctx: &RubricContext) -> i32 {
    LOGO_RUBRIC
        .iter()
        .filter(|rule| (rule.matches)(el, ctx))
        .map(|rule| rule.weight)
        .sum()
}

/// Pick the most likely logo from the candidate pool.
///
/// Eligibility: both dimensions above [`MIN_DIMENSION`], a usable source,
/// and a positive score. Highest score wins; equal scores keep the earlier
/// candidate in document order (the snapshot script preserves it).
pub fn identify(candidates: &[LogoElementSnapshot], page_url: &Url) -> Option<String> {
    let ctx = RubricContext::for_page(page_url);

    let mut best: Option<(i32, &str)> = None;
    for el in candidates {
        if el.width <= MIN_DIMENSION || el.height <= MIN_DIMENSION {
            continue;
        }
        let Some(src) = el.src.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        let total = score(el, &ctx);
        if total <= 0 {
            continue;
        }
        if best.map_or(true, |(leader, _)| total > leader) {
            best = Some((total, src));
        }
    }

    best.map(|(_, src)| crate::extract::assets::resolve_or_raw(src, page_url))
}

//! Representative font families for body and heading text.

use crate::report::FontPair;
use serde::Deserialize;

/// Computed `font-family` of the body and the first three heading levels.
pub const FONT_SNAPSHOT_JS: &str = r#"
(() => {
  const family = (sel) => {
    const el = document.querySelector(sel);
    return el ? window.getComputedStyle(el).fontFamily : null;
  };
  return { body: family('body'), h1: family('h1'), h2: family('h2'), h3: family('h3') };
})()
"#;

/// Raw computed families, `null` where the selector matched nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FontSnapshot {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub h1: Option<String>,
    #[serde(default)]
    pub h2: Option<String>,
    #[serde(default)]
    pub h3: Option<String>,
}

/// First family of a comma-separated `font-family` value, quotes stripped.
pub fn primary_family(raw: &str) -> Option<String> {
    let family = raw
        .split(',')
        .next()?
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    if family.is_empty() {
        return None;
    }
    Some(family.to_string())
}

/// Reduce a snapshot to the reported pair. The heading lookup tries `h1`,
/// `h2`, `h3` in order; the first element present on the page wins.
pub fn read(snapshot: &FontSnapshot) -> FontPair {
    let heading = [&snapshot.h1, &snapshot.h2, &snapshot.h3]
        .into_iter()
        .find_map(|f| f.as_deref())
        .and_then(primary_family);

    FontPair {
        body: snapshot.body.as_deref().and_then(primary_family),
        heading,
    }
}

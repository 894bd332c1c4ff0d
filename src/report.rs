//! The report produced by a pipeline run.

use serde::{Deserialize, Serialize};

/// Complete visual-identity report for one page.
///
/// Produced whole at the end of the pipeline and immutable afterwards;
/// progress events are a side channel, not part of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandReport {
    /// The URL the caller asked for.
    pub url: String,
    /// Textual identity fields.
    pub meta: PageMeta,
    /// Logo, screenshot, and candidate imagery.
    pub assets: AssetBundle,
    /// Dominant palette: six `#rrggbb` entries, or the four-color neutral
    /// fallback when quantization failed.
    pub colors: Vec<String>,
    /// Representative font families.
    pub fonts: FontPair,
}

/// Human-meaningful identity fields recovered from the rendered markup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: String,
    /// Never empty; falls back to the capitalized host label, then "Site".
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
}

/// Visual assets discovered on the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetBundle {
    /// Best-guess logo URL, absolute where resolution succeeded.
    pub logo: Option<String>,
    /// Viewport screenshot as a `data:image/jpeg;base64,…` URI.
    pub screenshot: String,
    /// Content images: absolute, deduplicated, never `data:` URIs, at most
    /// [`MAX_IMAGES`](crate::extract::assets::MAX_IMAGES) entries.
    pub images: Vec<String>,
    /// Favicon URLs, absolute; unresolvable entries are dropped.
    pub favicons: Vec<String>,
}

/// Font families for the two representative text roles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontPair {
    pub body: Option<String>,
    pub heading: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_optional_meta_away() {
        let report = BrandReport {
            url: "https://example.com/".to_string(),
            meta: PageMeta {
                title: "Example".to_string(),
                brand: "Example".to_string(),
                description: None,
                keywords: None,
            },
            assets: AssetBundle {
                logo: None,
                screenshot: "data:image/jpeg;base64,".to_string(),
                images: Vec::new(),
                favicons: Vec::new(),
            },
            colors: vec!["#000000".to_string()],
            fonts: FontPair::default(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["meta"].get("description").is_none());
        // Logo stays explicitly null; consumers branch on it.
        assert!(json["assets"]["logo"].is_null());
        assert_eq!(json["fonts"]["body"], serde_json::Value::Null);
    }

    #[test]
    fn test_report_roundtrip() {
        let report = BrandReport {
            url: "https://acme.dev/".to_string(),
            meta: PageMeta {
                title: "Acme | Home".to_string(),
                brand: "Acme".to_string(),
                description: Some("Widgets".to_string()),
                keywords: None,
            },
            assets: AssetBundle {
                logo: Some("https://acme.dev/logo.svg".to_string()),
                screenshot: "data:image/jpeg;base64,AAAA".to_string(),
                images: vec!["https://acme.dev/hero.png".to_string()],
                favicons: vec!["https://acme.dev/favicon.ico".to_string()],
            },
            colors: vec!["#112233".to_string()],
            fonts: FontPair {
                body: Some("Inter".to_string()),
                heading: Some("Söhne".to_string()),
            },
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: BrandReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.meta.brand, "Acme");
        assert_eq!(parsed.assets.images.len(), 1);
        assert_eq!(parsed.fonts.heading.as_deref(), Some("Söhne"));
    }
}

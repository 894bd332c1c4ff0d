//! Browser-free end-to-end checks over the pure pipeline stages.
//!
//! Feeds realistic page snapshots through the same functions the pipeline
//! calls and asserts the report contract holds.

use brandlens::extract::{assets, logo, metadata, typography};
use brandlens::palette;
use brandlens::report::{AssetBundle, BrandReport};
use url::Url;

const LANDING_PAGE: &str = r#"
<html><head>
<title>Acme | Home</title>
<meta name="description" content="Acme makes delightful widgets." />
<meta name="keywords" content="widgets, acme" />
<link rel="icon" href="/favicon.ico" />
<link rel="apple-touch-icon" href="/touch-icon.png" />
</head><body>
<header><a href="/"><img src="/img/logo-main.png" class="site-logo" alt="Acme" /></a></header>
<main><img src="/img/hero.jpg" srcset="/img/hero-480.jpg 480w, /img/hero-1200.jpg 1200w" /></main>
</body></html>
"#;

fn page_url() -> Url {
    Url::parse("https://www.acme.dev/").unwrap()
}

fn asset_snapshot() -> assets::AssetSnapshot {
    serde_json::from_value(serde_json::json!({
        "images": [
            { "current": "https://www.acme.dev/img/logo-main.png", "src": "/img/logo-main.png",
              "data_src": null, "srcset": null },
            { "current": null, "src": "/img/hero.jpg", "data_src": null,
              "srcset": "/img/hero-480.jpg 480w, /img/hero-1200.jpg 1200w" },
            { "current": null, "src": "data:image/gif;base64,R0lGOD", "data_src": null, "srcset": null },
            { "current": null, "src": "/img/hero.jpg", "data_src": null,
              "srcset": "/img/hero-480.jpg 480w, /img/hero-1200.jpg 1200w" }
        ],
        "backgrounds": ["/img/bg-texture.png"]
    }))
    .unwrap()
}

fn logo_candidates() -> Vec<logo::LogoElementSnapshot> {
    serde_json::from_value(serde_json::json!([
        { "src": "/img/logo-main.png", "class": "site-logo", "id": "", "alt": "Acme",
          "top": 12.0, "left": 30.0, "width": 160.0, "height": 48.0, "link_href": "/" },
        { "src": "/img/hero.jpg", "class": "", "id": "", "alt": "",
          "top": 300.0, "left": 0.0, "width": 800.0, "height": 400.0, "link_href": null }
    ]))
    .unwrap()
}

fn assemble() -> BrandReport {
    let base = page_url();
    let meta = metadata::read(LANDING_PAGE, &base);
    let images = assets::collect_images(&asset_snapshot(), &base);
    let favicons = assets::collect_favicons(LANDING_PAGE, &base);
    let logo = logo::identify(&logo_candidates(), &base);
    let fonts = typography::read(
        &serde_json::from_value(serde_json::json!({
            "body": "\"Helvetica Neue\", Arial, sans-serif",
            "h1": "Lexend, sans-serif",
            "h2": null,
            "h3": null
        }))
        .unwrap(),
    );

    BrandReport {
        url: base.to_string(),
        meta,
        assets: AssetBundle {
            logo,
            screenshot: "data:image/jpeg;base64,AAAA".to_string(),
            images,
            favicons,
        },
        colors: palette::fallback_palette(),
        fonts,
    }
}

#[test]
fn report_invariants_hold() {
    let report = assemble();

    assert_eq!(report.meta.brand, "Acme");
    assert_eq!(report.meta.description.as_deref(), Some("Acme makes delightful widgets."));

    // Images: absolute, deduplicated, no data: URIs, capped.
    assert!(report.assets.images.len() <= assets::MAX_IMAGES);
    let mut seen = std::collections::HashSet::new();
    for image in &report.assets.images {
        assert!(image.starts_with("https://"), "not absolute: {image}");
        assert!(!image.starts_with("data:"));
        assert!(seen.insert(image.clone()), "duplicate entry: {image}");
    }
    // The srcset winner is the 1200w variant, listed once.
    assert!(report
        .assets
        .images
        .contains(&"https://www.acme.dev/img/hero-1200.jpg".to_string()));

    assert_eq!(
        report.assets.logo.as_deref(),
        Some("https://www.acme.dev/img/logo-main.png")
    );
    assert_eq!(
        report.assets.favicons,
        vec![
            "https://www.acme.dev/favicon.ico".to_string(),
            "https://www.acme.dev/touch-icon.png".to_string(),
        ]
    );

    assert_eq!(report.fonts.body.as_deref(), Some("Helvetica Neue"));
    assert_eq!(report.fonts.heading.as_deref(), Some("Lexend"));
}

#[test]
fn colors_always_match_hex_contract() {
    let hex = regex::Regex::new(r"^#[0-9a-f]{6}$").unwrap();

    let fallback = palette::fallback_palette();
    assert_eq!(fallback.len(), 4);
    for color in &fallback {
        assert!(hex.is_match(color));
    }

    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        64,
        64,
        image::Rgb([180, 40, 90]),
    ));
    let extracted = palette::dominant_colors(&img, palette::PALETTE_SIZE);
    assert_eq!(extracted.len(), 6);
    for color in &extracted {
        assert!(hex.is_match(color), "bad entry: {color}");
    }
}

#[test]
fn report_serializes_to_expected_shape() {
    let report = assemble();
    let json = serde_json::to_value(&report).unwrap();

    for key in ["url", "meta", "assets", "colors", "fonts"] {
        assert!(json.get(key).is_some(), "missing top-level key {key}");
    }
    assert!(json["assets"]["screenshot"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
    assert!(json["colors"].as_array().unwrap().len() >= 4);
}

//! Full pipeline smoke test against a real Chromium.

use brandlens::progress::FnSink;
use brandlens::renderer::HostStrategy;
use brandlens::{ProgressEvent, Scraper};
use std::sync::Mutex;

const FIXTURE_PAGE: &str = "data:text/html,<html><head><title>Fixture | Test</title></head>\
<body style=\"background:%23112233;font-family:Arial\"><h1>Fixture</h1>\
<img src=\"logo.png\" class=\"logo\" width=\"100\" height=\"40\"></body></html>";

#[tokio::test]
#[ignore] // Requires Chromium to be installed
async fn test_pipeline_end_to_end() {
    let percents = Mutex::new(Vec::new());
    let sink = FnSink(|event: ProgressEvent| percents.lock().unwrap().push(event.percent));

    let scraper = Scraper::new(Box::new(HostStrategy::new()));
    let report = scraper
        .run(FIXTURE_PAGE, &sink)
        .await
        .expect("pipeline failed");

    // Progress is monotonic and covers the full stage list.
    let percents = percents.lock().unwrap();
    assert_eq!(percents.len(), 11);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));

    // Report contract.
    assert!(!report.meta.brand.is_empty());
    assert!(report.assets.screenshot.starts_with("data:image/jpeg;base64,"));
    assert!(report.colors.len() == 4 || report.colors.len() == 6);
    for color in &report.colors {
        assert!(color.starts_with('#') && color.len() == 7);
    }
    for image in &report.assets.images {
        assert!(!image.starts_with("data:"));
    }
    assert!(report.fonts.body.is_some());
}

#[tokio::test]
#[ignore] // Requires Chromium to be installed
async fn test_navigation_failure_still_releases_session() {
    let scraper = Scraper::new(Box::new(HostStrategy::new()));
    // An unroutable address fails navigation; the run must return an error
    // rather than hang on a leaked browser.
    let result = scraper
        .run("http://127.0.0.1:9/", &brandlens::NoopSink)
        .await;
    assert!(result.is_err());
}

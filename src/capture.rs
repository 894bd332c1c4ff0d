//! Viewport screenshot capture.
//!
//! The capture sequence scrolls back to the top, lets fixed headers and
//! entrance animations settle, shrinks the viewport, and takes a lossy
//! viewport-only shot so the embedded payload stays in the 100-200KB range.

use crate::error::ScrapeResult;
use base64::Engine;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use std::time::Duration;

/// Viewport used for the capture itself.
const CAPTURE_VIEWPORT: (u32, u32) = (800, 600);

/// Settle pause after scrolling back to the top.
const SETTLE: Duration = Duration::from_millis(500);

/// JPEG quality; bounds payload size at an acceptable visual loss.
const JPEG_QUALITY: i64 = 50;

/// Capture a representative viewport screenshot as JPEG bytes.
///
/// Leaves the page scrolled to the top and the viewport at the capture
/// size; later DOM heuristics rely on the former.
pub async fn capture_screenshot(page: &Page) -> ScrapeResult<Vec<u8>> {
    page.evaluate("window.scrollTo(0, 0)").await?;
    tokio::time::sleep(SETTLE).await;

    page.execute(SetDeviceMetricsOverrideParams::new(
        i64::from(CAPTURE_VIEWPORT.0),
        i64::from(CAPTURE_VIEWPORT.1),
        1.0,
        false,
    ))
    .await?;

    let bytes = page
        .screenshot(
            ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Jpeg)
                .quality(JPEG_QUALITY)
                .full_page(false)
                .build(),
        )
        .await?;

    Ok(bytes)
}

/// Encode screenshot bytes as a self-contained `data:` URI.
pub fn to_data_uri(bytes: &[u8]) -> String {
    format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_prefix_and_payload() {
        let uri = to_data_uri(&[0xff, 0xd8, 0xff]);
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert!(uri.ends_with("/9j/"));
    }

    #[test]
    fn test_data_uri_of_empty_payload() {
        assert_eq!(to_data_uri(&[]), "data:image/jpeg;base64,");
    }
}

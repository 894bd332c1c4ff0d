//! Dominant-color palette extraction from the captured screenshot.
//!
//! Quantization is a small deterministic k-means over a downscaled copy of
//! the screenshot. Palette extraction never fails the pipeline: any error
//! (file write, decode, empty image) degrades to the fixed neutral
//! fallback.

use crate::error::ScrapeResult;
use crate::renderer::RenderStrategy;
use image::DynamicImage;
use tracing::warn;

/// Palette size on the successful path.
pub const PALETTE_SIZE: usize = 6;

/// Neutral palette substituted when quantization fails at any stage.
pub const FALLBACK_PALETTE: [&str; 4] = ["#000000", "#ffffff", "#333333", "#666666"];

/// Downscale target before clustering; keeps the pixel count bounded.
const SAMPLE_EDGE: u32 = 100;

/// Fixed iteration count; centroids settle well before this on real pages.
const KMEANS_ITERATIONS: usize = 8;

/// Extract the dominant palette, or the neutral fallback on any failure.
pub fn extract(strategy: &dyn RenderStrategy, screenshot: &[u8]) -> Vec<String> {
    match try_extract(strategy, screenshot) {
        Ok(colors) if !colors.is_empty() => colors,
        Ok(_) => {
            warn!("screenshot produced no pixels; using fallback palette");
            fallback_palette()
        }
        Err(e) => {
            warn!("palette extraction failed ({e}); using fallback palette");
            fallback_palette()
        }
    }
}

/// The neutral fallback as owned strings.
pub fn fallback_palette() -> Vec<String> {
    FALLBACK_PALETTE.iter().map(|c| c.to_string()).collect()
}

fn try_extract(strategy: &dyn RenderStrategy, screenshot: &[u8]) -> ScrapeResult<Vec<String>> {
    let img = strategy.decode_screenshot(screenshot)?;
    Ok(dominant_colors(&img, PALETTE_SIZE))
}

/// Format one RGB triple as lowercase `#rrggbb`.
pub fn rgb_hex(r: u8, g: u8, b: u8) -> String {
    let packed = (1u32 << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
    format!("#{:06x}", packed & 0x00ff_ffff)
}

/// Cluster the image's pixels into `k` dominant colors, most populous
/// first. Returns an empty vector only for an empty image.
///
/// Seeding is deterministic: the sampled pixels are ordered by luminance
/// and centroids start at evenly spaced quantiles, so identical input
/// yields an identical palette.
pub fn dominant_colors(img: &DynamicImage, k: usize) -> Vec<String> {
    let small = img.thumbnail(SAMPLE_EDGE, SAMPLE_EDGE).to_rgb8();
    let pixels: Vec<[f32; 3]> = small
        .pixels()
        .map(|p| [f32::from(p.0[0]), f32::from(p.0[1]), f32::from(p.0[2])])
        .collect();
    if pixels.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..pixels.len()).collect();
    order.sort_by(|&a, &b| luminance(&pixels[a]).total_cmp(&luminance(&pixels[b])));

    let mut centroids: Vec<[f32; 3]> = (0..k)
        .map(|i| {
            let pos = i * (pixels.len() - 1) / (k - 1).max(1);
            pixels[order[pos]]
        })
        .collect();

    let mut assignments = vec![0usize; pixels.len()];
    for _ in 0..KMEANS_ITERATIONS {
        for (px, slot) in pixels.iter().zip(assignments.iter_mut()) {
            *slot = nearest_centroid(px, &centroids);
        }

        let mut sums = vec![[0.0f32; 3]; k];
        let mut counts = vec![0usize; k];
        for (px, &slot) in pixels.iter().zip(assignments.iter()) {
            for c in 0..3 {
                sums[slot][c] += px[c];
            }
            counts[slot] += 1;
        }
        for (centroid, (sum, &count)) in centroids.iter_mut().zip(sums.iter().zip(counts.iter())) {
            if count > 0 {
                for c in 0..3 {
                    centroid[c] = sum[c] / count as f32;
                }
            }
        }
    }

    let mut counts = vec![0usize; k];
    for &slot in &assignments {
        counts[slot] += 1;
    }
    let mut ranked: Vec<usize> = (0..k).collect();
    ranked.sort_by(|&a, &b| counts[b].cmp(&counts[a]));

    ranked
        .into_iter()
        .map(|i| {
            let c = centroids[i];
            rgb_hex(channel(c[0]), channel(c[1]), channel(c[2]))
        })
        .collect()
}

fn channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn luminance(px: &[f32; 3]) -> f32 {
    0.299 * px[0] + 0.587 * px[1] + 0.114 * px[2]
}

fn nearest_centroid(px: &[f32; 3], centroids: &[[f32; 3]]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::MAX;
    for (i, c) in centroids.iter().enumerate() {
        let dist = (px[0] - c[0]).powi(2) + (px[1] - c[1]).powi(2) + (px[2] - c[2]).powi(2);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn two_tone_image() -> DynamicImage {
        // Left three quarters red, right quarter blue.
        let mut img = RgbImage::new(80, 40);
        for (x, _y, px) in img.enumerate_pixels_mut() {
            *px = if x < 60 { Rgb([200, 30, 30]) } else { Rgb([20, 40, 200]) };
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_rgb_hex_formatting() {
        assert_eq!(rgb_hex(0, 0, 0), "#000000");
        assert_eq!(rgb_hex(255, 255, 255), "#ffffff");
        assert_eq!(rgb_hex(0x12, 0xab, 0x03), "#12ab03");
    }

    #[test]
    fn test_hex_format_property() {
        let pattern = regex::Regex::new(r"^#[0-9a-f]{6}$").unwrap();
        let img = two_tone_image();
        for color in dominant_colors(&img, PALETTE_SIZE) {
            assert!(pattern.is_match(&color), "bad hex entry: {color}");
        }
        for color in FALLBACK_PALETTE {
            assert!(pattern.is_match(color), "bad fallback entry: {color}");
        }
    }

    #[test]
    fn test_dominant_color_ranked_first() {
        let colors = dominant_colors(&two_tone_image(), PALETTE_SIZE);
        assert_eq!(colors.len(), PALETTE_SIZE);
        // The red side covers three quarters of the pixels; a reddish
        // centroid must rank first.
        let first = u32::from_str_radix(&colors[0][1..3], 16).unwrap();
        assert!(first > 120, "expected a red-dominant leader, got {}", colors[0]);
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let img = two_tone_image();
        assert_eq!(
            dominant_colors(&img, PALETTE_SIZE),
            dominant_colors(&img, PALETTE_SIZE)
        );
    }

    #[test]
    fn test_monochrome_image_converges() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([51, 51, 51])));
        let colors = dominant_colors(&img, PALETTE_SIZE);
        assert_eq!(colors.len(), PALETTE_SIZE);
        assert!(colors.iter().all(|c| c == "#333333"));
    }

    #[test]
    fn test_fallback_shape() {
        let fallback = fallback_palette();
        assert_eq!(fallback.len(), 4);
        assert_eq!(fallback[0], "#000000");
        assert_eq!(fallback[3], "#666666");
    }
}

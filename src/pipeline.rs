//! The extraction pipeline: one URL in, one [`BrandReport`] out.
//!
//! A run is a linear sequence of suspending stages over a single render
//! session. Each stage pushes one progress event before starting. Launch
//! and navigation failures abort the run; every heuristic stage degrades
//! to a default or fallback value instead.

use crate::capture;
use crate::error::ScrapeResult;
use crate::extract::{assets, logo, metadata, typography};
use crate::navigation;
use crate::palette;
use crate::progress::{ProgressEvent, ProgressSink, ScrapeStage};
use crate::renderer::{strategy_from_env, RenderSession, RenderStrategy};
use crate::report::{AssetBundle, BrandReport};
use std::time::Instant;
use tracing::{info, warn};
use url::Url;

/// Pipeline entry point, bound to the deployment strategy chosen at
/// startup.
pub struct Scraper {
    strategy: Box<dyn RenderStrategy>,
}

impl Scraper {
    pub fn new(strategy: Box<dyn RenderStrategy>) -> Self {
        Self { strategy }
    }

    /// Build a scraper for the detected deployment mode.
    pub fn from_env() -> Self {
        Self::new(strategy_from_env())
    }

    /// Extract a visual identity report for `target_url`.
    ///
    /// The render session is released on every exit path, success or
    /// failure; the caller marks 100% itself after a successful return.
    pub async fn run(&self, target_url: &str, sink: &dyn ProgressSink) -> ScrapeResult<BrandReport> {
        let target = Url::parse(target_url)?;
        let start = Instant::now();
        info!("scraping {target} in {} mode", self.strategy.mode());

        emit(sink, ScrapeStage::Initializing);
        let session = self.strategy.launch().await?;

        let result = self.run_stages(&session, target_url, &target, sink).await;

        if let Err(e) = session.close().await {
            warn!("render session close failed: {e}");
        }

        match &result {
            Ok(_) => info!("scrape finished in {:.1}s", start.elapsed().as_secs_f64()),
            Err(e) => warn!("scrape failed after {:.1}s: {e}", start.elapsed().as_secs_f64()),
        }
        result
    }

    async fn run_stages(
        &self,
        session: &RenderSession,
        target_url: &str,
        target: &Url,
        sink: &dyn ProgressSink,
    ) -> ScrapeResult<BrandReport> {
        let page = session.page();

        emit(sink, ScrapeStage::Navigating);
        navigation::navigate(page, target.as_str()).await?;

        emit(sink, ScrapeStage::ScanningLazyContent);
        navigation::auto_scroll(page).await?;

        emit(sink, ScrapeStage::AwaitingNetworkIdle);
        navigation::await_network_idle(page).await;

        emit(sink, ScrapeStage::ExtractingMetadata);
        let html = page.content().await?;
        let base = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(u.as_str()).ok())
            .unwrap_or_else(|| target.clone());
        let meta = metadata::read(&html, target);

        emit(sink, ScrapeStage::CapturingScreenshot);
        let screenshot = capture::capture_screenshot(page).await?;

        emit(sink, ScrapeStage::ExtractingAssets);
        let asset_snapshot: assets::AssetSnapshot =
            page.evaluate(assets::ASSET_SNAPSHOT_JS).await?.into_value()?;
        let images = assets::collect_images(&asset_snapshot, &base);
        let favicons = assets::collect_favicons(&html, &base);

        emit(sink, ScrapeStage::IdentifyingLogo);
        let logo_candidates: Vec<logo::LogoElementSnapshot> =
            page.evaluate(logo::LOGO_SNAPSHOT_JS).await?.into_value()?;
        let logo = logo::identify(&logo_candidates, &base);

        emit(sink, ScrapeStage::AnalyzingColors);
        let colors = palette::extract(self.strategy.as_ref(), &screenshot);

        emit(sink, ScrapeStage::IdentifyingTypography);
        let font_snapshot: typography::FontSnapshot =
            page.evaluate(typography::FONT_SNAPSHOT_JS).await?.into_value()?;
        let fonts = typography::read(&font_snapshot);

        emit(sink, ScrapeStage::Finalizing);
        Ok(BrandReport {
            url: target_url.to_string(),
            meta,
            assets: AssetBundle {
                logo,
                screenshot: capture::to_data_uri(&screenshot),
                images,
                favicons,
            },
            colors,
            fonts,
        })
    }
}

fn emit(sink: &dyn ProgressSink, stage: ScrapeStage) {
    info!("{stage} ({}%)", stage.percent());
    sink.emit(ProgressEvent::at(stage));
}

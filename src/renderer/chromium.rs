//! Chromium session management via chromiumoxide.
//!
//! One [`RenderSession`] wraps one browser process and one page. The
//! session applies the network-resource filtering policy at creation and
//! is closed exactly once by the pipeline, on every exit path.

use super::{DeployMode, RenderStrategy};
use crate::error::{ScrapeError, ScrapeResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::SetLifecycleEventsEnabledParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use image::DynamicImage;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Initial viewport; large enough to force desktop layout.
const INITIAL_VIEWPORT: (u32, u32) = (1920, 1080);

/// Minimal argument set for the compact sandbox-mode binary.
const SANDBOX_ARGS: &[&str] = &["--headless=new", "--disable-gpu"];

/// Full-browser arguments suited to containerized hosts.
const HOST_ARGS: &[&str] = &[
    "--headless=new",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-background-networking",
];

/// Find the browser binary for the given mode.
pub fn find_browser(mode: DeployMode) -> Option<PathBuf> {
    if let Ok(p) = std::env::var("BRANDLENS_CHROMIUM") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    if mode == DeployMode::Sandbox {
        for candidate in ["/opt/chromium/chrome", "/opt/chrome/chrome"] {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        let candidates = [
            home.join(".brandlens/chromium/chrome-linux64/chrome"),
            home.join(".brandlens/chromium/chrome"),
        ];
        for candidate in candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// One browser process plus one page, owned exclusively by one request.
pub struct RenderSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    intercept_task: JoinHandle<()>,
}

impl RenderSession {
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Release the session: page, browser process, and background tasks.
    ///
    /// Consumes the session so a second release cannot compile. Must be
    /// called on every exit path; the pipeline owns that guarantee.
    pub async fn close(mut self) -> ScrapeResult<()> {
        if let Err(e) = self.page.close().await {
            debug!("page close: {e}");
        }
        let closed = self.browser.close().await;
        // The handler task drives the CDP transport; keep it alive until
        // the close command has gone out.
        self.intercept_task.abort();
        self.handler_task.abort();
        closed?;
        Ok(())
    }
}

/// Launch a browser in the given mode and prepare a filtered page.
async fn launch(mode: DeployMode, args: &[&str]) -> ScrapeResult<RenderSession> {
    let binary = find_browser(mode).ok_or_else(|| {
        ScrapeError::Launch(format!(
            "no Chromium binary found for {mode} mode; set BRANDLENS_CHROMIUM"
        ))
    })?;
    debug!("launching {} in {mode} mode", binary.display());

    let mut builder = BrowserConfig::builder()
        .chrome_executable(binary)
        .window_size(INITIAL_VIEWPORT.0, INITIAL_VIEWPORT.1);
    for arg in args {
        builder = builder.arg(*arg);
    }
    let config = builder.build().map_err(ScrapeError::Launch)?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| ScrapeError::Launch(e.to_string()))?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("cdp handler: {e}");
            }
        }
    });

    let session_setup = async {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Launch(format!("page acquisition failed: {e}")))?;
        page.execute(SetLifecycleEventsEnabledParams::new(true))
            .await?;
        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(INITIAL_VIEWPORT.0),
            i64::from(INITIAL_VIEWPORT.1),
            1.0,
            false,
        ))
        .await?;
        let intercept_task = enable_request_filtering(&page).await?;
        Ok::<_, ScrapeError>((page, intercept_task))
    };

    match session_setup.await {
        Ok((page, intercept_task)) => Ok(RenderSession {
            browser,
            page,
            handler_task,
            intercept_task,
        }),
        Err(e) => {
            // Dropping the browser kills the child process.
            handler_task.abort();
            Err(e)
        }
    }
}

/// Intercept every request and abort the low-value categories.
async fn enable_request_filtering(page: &Page) -> ScrapeResult<JoinHandle<()>> {
    page.execute(EnableParams::default()).await?;
    let mut requests = page.event_listener::<EventRequestPaused>().await?;
    let page = page.clone();

    Ok(tokio::spawn(async move {
        while let Some(event) = requests.next().await {
            let request_id = event.request_id.clone();
            let outcome = if should_abort(&event.resource_type) {
                page.execute(FailRequestParams::new(request_id, ErrorReason::Aborted))
                    .await
                    .map(|_| ())
            } else {
                page.execute(ContinueRequestParams::new(request_id))
                    .await
                    .map(|_| ())
            };
            if let Err(e) = outcome {
                debug!("request interception: {e}");
            }
        }
    }))
}

/// Resource categories aborted to shorten load time: media streams, text
/// tracks, plugin/object loads, analytics beacons, CSP reports, and
/// speculative prefetch duplicates. Fonts must stay enabled; typography
/// extraction depends on them.
fn should_abort(resource: &ResourceType) -> bool {
    matches!(
        resource,
        ResourceType::Media
            | ResourceType::TextTrack
            | ResourceType::Other
            | ResourceType::Ping
            | ResourceType::CspViolationReport
            | ResourceType::Prefetch
    )
}

/// Sandboxed-serverless strategy: compact binary, scratch-dir writes.
pub struct SandboxStrategy {
    scratch_dir: PathBuf,
}

impl SandboxStrategy {
    pub fn new() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl Default for SandboxStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RenderStrategy for SandboxStrategy {
    async fn launch(&self) -> ScrapeResult<RenderSession> {
        launch(DeployMode::Sandbox, SANDBOX_ARGS).await
    }

    fn decode_screenshot(&self, screenshot: &[u8]) -> ScrapeResult<DynamicImage> {
        // The scratch dir is the only writable location in this mode.
        let path = self
            .scratch_dir
            .join(format!("brandlens-capture-{}.jpg", std::process::id()));
        std::fs::write(&path, screenshot)?;
        Ok(image::open(&path)?)
    }

    fn mode(&self) -> DeployMode {
        DeployMode::Sandbox
    }
}

/// Persistent-host strategy: full browser, durable capture directory.
pub struct HostStrategy {
    capture_dir: PathBuf,
}

impl HostStrategy {
    pub fn new() -> Self {
        let capture_dir = dirs::home_dir()
            .map(|home| home.join(".brandlens/captures"))
            .unwrap_or_else(|| std::env::temp_dir().join("brandlens-captures"));
        Self { capture_dir }
    }

    pub fn with_capture_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            capture_dir: dir.into(),
        }
    }
}

impl Default for HostStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RenderStrategy for HostStrategy {
    async fn launch(&self) -> ScrapeResult<RenderSession> {
        launch(DeployMode::Host, HOST_ARGS).await
    }

    fn decode_screenshot(&self, screenshot: &[u8]) -> ScrapeResult<DynamicImage> {
        std::fs::create_dir_all(&self.capture_dir)?;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let path = self
            .capture_dir
            .join(format!("capture-{}-{stamp}.jpg", std::process::id()));
        if let Err(e) = std::fs::write(&path, screenshot) {
            warn!("durable capture write failed at {}: {e}", path.display());
            return Err(e.into());
        }
        Ok(image::open(&path)?)
    }

    fn mode(&self) -> DeployMode {
        DeployMode::Host
    }
}

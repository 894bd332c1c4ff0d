//! Browser strategy abstraction.
//!
//! The two deployment environments differ in how the browser is launched
//! and where screenshot bytes may be written for pixel access. Both
//! decisions live behind [`RenderStrategy`], chosen once at startup from
//! [`DeployMode::detect`], so no mode checks leak into the pipeline.

pub mod chromium;

pub use chromium::{HostStrategy, RenderSession, SandboxStrategy};

use crate::error::ScrapeResult;
use async_trait::async_trait;
use image::DynamicImage;
use std::sync::OnceLock;
use tracing::warn;

/// Environment variables that mark a sandboxed-serverless runtime.
const SERVERLESS_VARS: [&str; 3] = ["AWS_LAMBDA_FUNCTION_NAME", "FUNCTION_TARGET", "K_SERVICE"];

/// The binary deployment-environment choice, read once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode {
    /// Resource-constrained execution with an ephemeral filesystem; only a
    /// scratch directory is writable.
    Sandbox,
    /// Persistent, fully-writable host (typically containerized).
    Host,
}

impl DeployMode {
    /// Detect the deployment mode from the environment. The result is
    /// cached for the lifetime of the process.
    pub fn detect() -> Self {
        static MODE: OnceLock<DeployMode> = OnceLock::new();
        *MODE.get_or_init(|| {
            let explicit = std::env::var("BRANDLENS_MODE").ok();
            let serverless = SERVERLESS_VARS
                .iter()
                .any(|v| std::env::var_os(v).is_some());
            Self::from_indicators(explicit.as_deref(), serverless)
        })
    }

    /// Resolve the mode from an explicit override and a serverless hint.
    /// The override wins; unrecognized values fall back to detection.
    pub fn from_indicators(explicit: Option<&str>, serverless: bool) -> Self {
        match explicit.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("sandbox") | Some("serverless") => return Self::Sandbox,
            Some("host") | Some("persistent") => return Self::Host,
            Some(other) => {
                warn!("unrecognized BRANDLENS_MODE {other:?}; detecting from environment")
            }
            None => {}
        }
        if serverless {
            Self::Sandbox
        } else {
            Self::Host
        }
    }
}

impl std::fmt::Display for DeployMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sandbox => write!(f, "sandbox"),
            Self::Host => write!(f, "host"),
        }
    }
}

/// Launch and pixel-access policy for one deployment environment.
#[async_trait]
pub trait RenderStrategy: Send + Sync {
    /// Launch a configured browser and hand back a ready-to-navigate
    /// session with resource filtering already applied.
    async fn launch(&self) -> ScrapeResult<RenderSession>;

    /// Write screenshot bytes through this strategy's file path and decode
    /// them into pixels for quantization.
    fn decode_screenshot(&self, screenshot: &[u8]) -> ScrapeResult<DynamicImage>;

    fn mode(&self) -> DeployMode;
}

/// The strategy for the detected deployment mode.
pub fn strategy_from_env() -> Box<dyn RenderStrategy> {
    match DeployMode::detect() {
        DeployMode::Sandbox => Box::new(SandboxStrategy::new()),
        DeployMode::Host => Box::new(HostStrategy::new()),
    }
}

// Copyright 2026 Brandlens Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress events and the sink they flow into.
//!
//! The pipeline emits one [`ProgressEvent`] immediately before each stage
//! starts. Progress is a capability injected into the pipeline, so the same
//! core serves both a streaming boundary (via the broadcast adapter) and a
//! plain synchronous caller (via [`NoopSink`] or a closure).

use serde::{Deserialize, Serialize};

/// The fixed checkpoints of one pipeline run, in execution order.
///
/// Percentages are monotonically non-decreasing but deliberately not evenly
/// spaced; they track where the wall-clock time actually goes. The caller
/// marks 100 itself after a successful return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrapeStage {
    Initializing,
    Navigating,
    ScanningLazyContent,
    AwaitingNetworkIdle,
    ExtractingMetadata,
    CapturingScreenshot,
    ExtractingAssets,
    IdentifyingLogo,
    AnalyzingColors,
    IdentifyingTypography,
    Finalizing,
}

impl ScrapeStage {
    /// All stages in pipeline order.
    pub const ALL: [ScrapeStage; 11] = [
        Self::Initializing,
        Self::Navigating,
        Self::ScanningLazyContent,
        Self::AwaitingNetworkIdle,
        Self::ExtractingMetadata,
        Self::CapturingScreenshot,
        Self::ExtractingAssets,
        Self::IdentifyingLogo,
        Self::AnalyzingColors,
        Self::IdentifyingTypography,
        Self::Finalizing,
    ];

    /// Completion estimate at the start of this stage.
    pub fn percent(self) -> u8 {
        match self {
            Self::Initializing => 0,
            Self::Navigating => 10,
            Self::ScanningLazyContent => 20,
            Self::AwaitingNetworkIdle => 40,
            Self::ExtractingMetadata => 50,
            Self::CapturingScreenshot => 60,
            Self::ExtractingAssets => 70,
            Self::IdentifyingLogo => 84,
            Self::AnalyzingColors => 85,
            Self::IdentifyingTypography => 90,
            Self::Finalizing => 98,
        }
    }
}

impl std::fmt::Display for ScrapeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Initializing => "initializing",
            Self::Navigating => "navigating",
            Self::ScanningLazyContent => "scanning for lazy content",
            Self::AwaitingNetworkIdle => "waiting for network idle",
            Self::ExtractingMetadata => "extracting metadata",
            Self::CapturingScreenshot => "capturing screenshot",
            Self::ExtractingAssets => "extracting assets",
            Self::IdentifyingLogo => "identifying logo",
            Self::AnalyzingColors => "analyzing colors",
            Self::IdentifyingTypography => "identifying typography",
            Self::Finalizing => "finalizing",
        };
        write!(f, "{label}")
    }
}

/// A single progress checkpoint. Serialized to JSON for streaming consumers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub stage: ScrapeStage,
    pub percent: u8,
}

impl ProgressEvent {
    /// The event emitted at the start of `stage`.
    pub fn at(stage: ScrapeStage) -> Self {
        Self {
            stage,
            percent: stage.percent(),
        }
    }
}

/// One-way consumer of progress events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Sink that discards every event.
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Adapter that turns a plain closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> ProgressSink for FnSink<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        (self.0)(event)
    }
}

/// Sender handle for streaming progress to multiple listeners.
pub type ProgressSender = tokio::sync::broadcast::Sender<ProgressEvent>;

/// Receiver handle for consuming streamed progress.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ProgressEvent>;

/// Create a progress broadcast channel.
///
/// A run emits eleven checkpoints, so a small buffer is plenty even for a
/// listener that drains lazily.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(64)
}

impl ProgressSink for ProgressSender {
    /// Send errors mean nobody is listening; events are dropped silently.
    fn emit(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

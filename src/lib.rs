// Copyright 2026 Brandlens Contributors
// SPDX-License-Identifier: Apache-2.0

//! Brandlens — visual identity extraction for public web pages.
//!
//! One call renders a page in headless Chromium and distills it into a
//! [`BrandReport`]: textual metadata, candidate imagery, a best-guess logo,
//! a dominant color palette, and representative typography.
//!
//! ```no_run
//! use brandlens::{NoopSink, Scraper};
//!
//! # async fn demo() -> Result<(), brandlens::ScrapeError> {
//! let scraper = Scraper::from_env();
//! let report = scraper.run("https://example.com", &NoopSink).await?;
//! println!("{}", report.meta.brand);
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod error;
pub mod extract;
pub mod navigation;
pub mod palette;
pub mod pipeline;
pub mod progress;
pub mod renderer;
pub mod report;

pub use error::{ScrapeError, ScrapeResult};
pub use pipeline::Scraper;
pub use progress::{FnSink, NoopSink, ProgressEvent, ProgressSink, ScrapeStage};
pub use renderer::DeployMode;
pub use report::BrandReport;

//! DOM heuristics over the rendered page.
//!
//! Each submodule pairs an in-page snapshot script (raw facts only) with a
//! pure function that applies the actual heuristic, so every judgement call
//! is unit-testable without a browser.

pub mod assets;
pub mod logo;
pub mod metadata;
pub mod typography;

// Copyright 2026 Brandlens Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use brandlens::progress::FnSink;
use brandlens::{ProgressEvent, Scraper};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "brandlens",
    about = "Brandlens — extract a visual identity report from a web page",
    version
)]
struct Cli {
    /// Page URL to analyze (e.g. "https://example.com")
    url: String,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Write the report to a file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let scraper = Scraper::from_env();
    let sink = FnSink(|event: ProgressEvent| {
        info!("progress: {} ({}%)", event.stage, event.percent);
    });

    let report = scraper
        .run(&cli.url, &sink)
        .await
        .with_context(|| format!("failed to scrape {}", cli.url))?;
    info!("progress: complete (100%)");

    let rendered = if cli.json {
        serde_json::to_string_pretty(&report)?
    } else {
        summarize(&report)
    };

    match cli.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "brandlens=debug"
    } else if quiet {
        "brandlens=error"
    } else {
        "brandlens=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn summarize(report: &brandlens::BrandReport) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "url        {}", report.url);
    let _ = writeln!(out, "brand      {}", report.meta.brand);
    let _ = writeln!(out, "title      {}", report.meta.title);
    if let Some(description) = &report.meta.description {
        let _ = writeln!(out, "about      {description}");
    }
    let _ = writeln!(
        out,
        "logo       {}",
        report.assets.logo.as_deref().unwrap_or("(none found)")
    );
    let _ = writeln!(out, "colors     {}", report.colors.join(" "));
    let _ = writeln!(
        out,
        "body font  {}",
        report.fonts.body.as_deref().unwrap_or("(unknown)")
    );
    let _ = writeln!(
        out,
        "head font  {}",
        report.fonts.heading.as_deref().unwrap_or("(unknown)")
    );
    let _ = writeln!(
        out,
        "assets     {} images, {} favicons, screenshot {} bytes (base64)",
        report.assets.images.len(),
        report.assets.favicons.len(),
        report.assets.screenshot.len()
    );
    out
}

// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use url::Url;

use wayback_harvest::events::HarvestEvent;
use wayback_harvest::harvest::validate_target;
use wayback_harvest::renderer::chromium::ChromiumRenderer;
use wayback_harvest::{CdxClient, CsvSink, HarvestConfig, Harvester, Renderer};

#[derive(Parser)]
#[command(
    name = "wayback-harvest",
    about = "Harvest the text of every archived snapshot of a web page",
    version
)]
struct Cli {
    /// Absolute URL of the page to harvest (e.g. "https://example.com/")
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli.url).await {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(raw_url: &str) -> Result<()> {
    let target = validate_target(raw_url)?;
    let parsed = Url::parse(target).context("invalid target URL")?;

    let config = HarvestConfig::default();
    let index = Arc::new(CdxClient::new(&config)?);
    let renderer = Arc::new(
        ChromiumRenderer::launch(config.network_idle)
            .await
            .context("failed to start browser")?,
    );
    let mut sink = CsvSink::for_target(&config.output_dir, &parsed);

    let harvester = Harvester::new(config, index, renderer.clone());
    let narrator = tokio::spawn(narrate(harvester.events().subscribe()));

    let result = harvester.run(target, &mut sink).await;

    drop(harvester);
    let _ = narrator.await;

    if let Err(e) = renderer.shutdown().await {
        tracing::warn!(error = %e, "browser did not shut down cleanly");
    }

    let report = result?;
    println!("Data written to {}", report.location);
    Ok(())
}

/// Print per-snapshot progress as the run reports it.
async fn narrate(mut rx: tokio::sync::broadcast::Receiver<HarvestEvent>) {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };
        match event {
            HarvestEvent::SnapshotFetching { replay_url, .. } => {
                println!("Fetching snapshot from {replay_url}...");
            }
            HarvestEvent::NavigationFailed {
                replay_url,
                attempt,
                max_attempts,
                ..
            } => {
                eprintln!("Failed to navigate to {replay_url}. Retry {attempt} of {max_attempts}.");
            }
            HarvestEvent::SnapshotSkipped {
                timestamp,
                reason,
                detail,
            } => {
                if detail.is_empty() {
                    println!("Skipping snapshot {timestamp}: {reason}.");
                } else {
                    println!("Skipping snapshot {timestamp}: {reason} ({detail}).");
                }
            }
            HarvestEvent::SnapshotRetained { date, text, .. } => {
                println!("Timestamp: {date}");
                println!("{text}");
            }
            HarvestEvent::IndexLoaded { snapshots, .. } => {
                println!("Found {snapshots} snapshot(s) in the retention window.");
            }
            // Fatal errors are reported once, by `main`.
            HarvestEvent::RunStarted { .. }
            | HarvestEvent::RowsWritten { .. }
            | HarvestEvent::RunFailed { .. } => {}
        }
    }
}

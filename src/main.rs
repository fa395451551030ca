// This is the entry point of the summary dashboard.
//
// **Architecture Overview:**
// - `core/` = Dashboard logic (report discovery, narration, presenter, manifest building)
// - `infra/` = Implementations of core traits (HTTP and disk sources, TTS program, archive)
// - `console/` = Terminal front end (commands, rendering, event loop)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Hand over to the console loop, or run `generate-index`

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "console/console_layer.rs"]
mod console;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

mod cli;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use crate::cli::{Cli, CliCommand};
use crate::config::{DashboardConfig, SourceLocation};
use crate::core::dashboard::{DashboardService, DashboardSettings};
use crate::core::index::IndexService;
use crate::core::reports::{Clock, LoaderSettings, ReportSource};
use crate::infra::index::DirectoryArchive;
use crate::infra::reports::{HttpReportSource, LocalReportSource};
use crate::infra::speech::CommandSpeechEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they don't interleave with the dashboard on stdout.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = DashboardConfig::from_env()?;

    if let Some(CliCommand::GenerateIndex { dir }) = cli.command {
        let dir = match (dir, &config.source) {
            (Some(dir), _) => dir,
            (None, SourceLocation::Directory(dir)) => dir.clone(),
            (None, SourceLocation::Http(_)) => anyhow::bail!(
                "generate-index needs a reports directory when DASHBOARD_SOURCE is a URL"
            ),
        };
        return generate_index(dir, config.clock()).await;
    }

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let source: Box<dyn ReportSource> = match &config.source {
        SourceLocation::Http(url) => Box::new(
            HttpReportSource::new(url).context("Failed to create HTTP report source")?,
        ),
        SourceLocation::Directory(path) => Box::new(LocalReportSource::new(path)),
    };
    tracing::info!(
        source = %source.describe(),
        policy = %config.policy,
        narrator = %config.narrator_command,
        "Starting dashboard"
    );

    let engine = CommandSpeechEngine::new(config.narrator_command.clone(), config.voices.clone());
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let dashboard = DashboardService::new(
        Arc::new(source),
        engine,
        DashboardSettings {
            loader: LoaderSettings::new(config.policy),
            preferred_voice: config.preferred_voice.clone(),
            clock: config.clock(),
        },
        events_tx,
    );

    console::run(dashboard, events_rx, BufReader::new(tokio::io::stdin())).await
}

async fn generate_index(dir: PathBuf, clock: Clock) -> anyhow::Result<()> {
    let service = IndexService::new(DirectoryArchive::new(&dir), clock);
    let (index, written) = service
        .generate()
        .await
        .with_context(|| format!("Failed to index {}", dir.display()))?;

    println!("✅ Indexed {} files", index.total_files);
    for path in written {
        println!("💾 {}", path);
    }
    Ok(())
}

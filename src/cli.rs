use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Terminal dashboard for the daily email summary reports.
#[derive(Debug, Parser)]
#[command(name = "summary_dashboard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum CliCommand {
    /// Write file_index.json (and a backup in logs/) for a reports directory
    GenerateIndex {
        /// Reports directory; defaults to DASHBOARD_SOURCE when that is a directory
        dir: Option<PathBuf>,
    },
}

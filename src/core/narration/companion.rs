use std::sync::Arc;

use crate::core::reports::{FileDescriptor, ReportDate, ReportSource};

use super::narration_models::NarrationScript;

/// Directories searched for a storytelling companion, in order.
pub const COMPANION_DIRS: [&str; 3] = ["storytelling/", "logs/", ""];

/// `YYYYMMDD_storytelling_summary.txt` for a dated report.
pub fn companion_name(date: &ReportDate) -> Option<String> {
    date.compact()
        .map(|day| format!("{}_storytelling_summary.txt", day))
}

/// Finds the narration-friendly companion of a report.
///
/// Companions never appear in the working set; they are only reachable by this
/// naming convention.
pub struct CompanionLocator<S: ReportSource> {
    source: Arc<S>,
    dirs: Vec<String>,
}

impl<S: ReportSource> CompanionLocator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            dirs: COMPANION_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Candidate paths are tried one after another; the first non-empty body wins.
    pub async fn find(&self, date: &ReportDate) -> Option<(String, String)> {
        let name = companion_name(date)?;

        for dir in &self.dirs {
            let path = format!("{}{}", dir, name);
            match self.source.fetch_text(&path).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::debug!(path = %path, "Found storytelling companion");
                    return Some((path, text));
                }
                Ok(_) => tracing::debug!(path = %path, "Ignoring empty storytelling companion"),
                Err(err) if err.is_not_found() => {}
                Err(err) => {
                    tracing::debug!(path = %path, error = %err, "Companion lookup failed")
                }
            }
        }

        None
    }

    /// Companion text when one exists, otherwise the report's own content.
    pub async fn narration_script(&self, descriptor: &FileDescriptor) -> NarrationScript {
        match self.find(&descriptor.date).await {
            Some((path, text)) => NarrationScript {
                text,
                companion_path: Some(path),
            },
            None => NarrationScript {
                text: descriptor.content.clone(),
                companion_path: None,
            },
        }
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::acceptance::{file_name, parse_file_info, AcceptancePolicy};
use super::report_models::{Clock, FileDescriptor, EXECUTIVE_SUMMARY_ALIAS, TODAY_REPORT_ALIAS};
use super::report_source::{FetchError, ReportSource};

pub const MANIFEST_PATH: &str = "file_index.json";
pub const LISTING_PATH: &str = "logs/";

static TXT_HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']+\.txt)["']"#).expect("static regex compile")
});

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("No report source reachable (manifest: {manifest}; listing: {listing})")]
    Unreachable { manifest: String, listing: String },
}

/// Manifest as published next to the dashboard. Only `name` and `content` are
/// required; everything else is derived again locally.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestDocument {
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Where the loader looks and which names it keeps.
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub policy: AcceptancePolicy,
    pub manifest_path: String,
    pub listing_path: String,
    /// Fixed fallback paths, tried individually when the manifest is missing.
    pub known_paths: Vec<String>,
    /// Dated `logs/` reports to try, counting back from today.
    pub recent_days: u32,
}

impl LoaderSettings {
    pub fn new(policy: AcceptancePolicy) -> Self {
        Self {
            policy,
            manifest_path: MANIFEST_PATH.to_string(),
            listing_path: LISTING_PATH.to_string(),
            known_paths: vec![
                format!("latest/{}", TODAY_REPORT_ALIAS),
                format!("latest/{}", EXECUTIVE_SUMMARY_ALIAS),
            ],
            recent_days: 7,
        }
    }
}

/// Resolves the working set of report descriptors from whichever source is reachable.
pub struct ReportLoader<S: ReportSource> {
    source: Arc<S>,
    settings: LoaderSettings,
    clock: Clock,
}

impl<S: ReportSource> ReportLoader<S> {
    pub fn new(source: Arc<S>, settings: LoaderSettings, clock: Clock) -> Self {
        Self {
            source,
            settings,
            clock,
        }
    }

    /// Load every report, newest first.
    ///
    /// The manifest wins when it is readable. Otherwise the known paths and the
    /// directory listing are tried; only when none of them answers is an error returned.
    pub async fn load(&self) -> Result<Vec<FileDescriptor>, LoaderError> {
        let today = self.clock.today();

        let manifest_error = match self.load_manifest(today).await {
            Ok(mut files) => {
                tracing::info!(count = files.len(), "Loaded reports from manifest");
                sort_newest_first(&mut files);
                return Ok(files);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Manifest unavailable, falling back to file discovery");
                err
            }
        };

        let mut files = self.load_fallback(today, manifest_error).await?;
        sort_newest_first(&mut files);
        Ok(files)
    }

    async fn load_manifest(&self, today: NaiveDate) -> Result<Vec<FileDescriptor>, FetchError> {
        let path = &self.settings.manifest_path;
        let text = self.source.fetch_text(path).await?;
        let document: ManifestDocument =
            serde_json::from_str(&text).map_err(|e| FetchError::Malformed {
                path: path.clone(),
                message: e.to_string(),
            })?;

        Ok(document
            .files
            .into_iter()
            .filter_map(|entry| {
                parse_file_info(
                    &entry.name,
                    entry.content,
                    entry.path,
                    self.settings.policy,
                    today,
                )
            })
            .collect())
    }

    async fn load_fallback(
        &self,
        today: NaiveDate,
        manifest_error: FetchError,
    ) -> Result<Vec<FileDescriptor>, LoaderError> {
        let mut files = self.fetch_all(self.known_candidates(today), today).await;
        let mut seen: HashSet<String> = files.iter().map(|f| f.name.clone()).collect();

        match self.scrape_listing().await {
            Ok(paths) => {
                let candidates = paths
                    .into_iter()
                    .filter(|path| seen.insert(file_name(path).to_string()))
                    .collect();
                files.extend(self.fetch_all(candidates, today).await);
            }
            Err(listing_error) => {
                tracing::warn!(error = %listing_error, "Directory listing unavailable");
                if files.is_empty() {
                    return Err(LoaderError::Unreachable {
                        manifest: manifest_error.to_string(),
                        listing: listing_error.to_string(),
                    });
                }
            }
        }

        tracing::info!(count = files.len(), "Loaded reports from fallback discovery");
        Ok(files)
    }

    fn known_candidates(&self, today: NaiveDate) -> Vec<String> {
        let dated = (0..self.settings.recent_days).map(|offset| {
            let day = today - Duration::days(i64::from(offset));
            format!("logs/{}_email_summary_report.txt", day.format("%Y%m%d"))
        });

        self.settings
            .known_paths
            .iter()
            .cloned()
            .chain(dated)
            .filter(|path| self.settings.policy.accepts(file_name(path)))
            .collect()
    }

    /// Pull `.txt` links out of the HTML directory listing, already resolved to source paths.
    async fn scrape_listing(&self) -> Result<Vec<String>, FetchError> {
        let listing_path = &self.settings.listing_path;
        let html = self.source.fetch_text(listing_path).await?;

        let mut paths = Vec::new();
        for capture in TXT_HREF_RE.captures_iter(&html) {
            let Some(path) = resolve_href(listing_path, &capture[1]) else {
                continue;
            };
            if !self.settings.policy.accepts(file_name(&path)) {
                tracing::debug!(path = %path, "Skipping listed file rejected by policy");
                continue;
            }
            if !paths.contains(&path) {
                paths.push(path);
            }
        }

        tracing::debug!(count = paths.len(), "Scraped report links from listing");
        Ok(paths)
    }

    /// Fetch candidates concurrently; returns once every fetch has settled.
    async fn fetch_all(&self, paths: Vec<String>, today: NaiveDate) -> Vec<FileDescriptor> {
        let fetches = paths.into_iter().map(|path| async move {
            match self.source.fetch_text(&path).await {
                Ok(content) => {
                    let name = file_name(&path).to_string();
                    parse_file_info(&name, content, Some(path), self.settings.policy, today)
                }
                Err(err) => {
                    tracing::debug!(path = %path, error = %err, "Skipping unreachable report");
                    None
                }
            }
        });

        join_all(fetches).await.into_iter().flatten().collect()
    }
}

/// Turn a listing href into a source path. External links are ignored.
fn resolve_href(listing_path: &str, href: &str) -> Option<String> {
    let href = href.split(['?', '#']).next()?;
    if href.contains("://") {
        return None;
    }

    let decoded = urlencoding::decode(href)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| href.to_string());

    let path = match decoded.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => {
            let dir = listing_path.trim_end_matches('/');
            let relative = decoded.trim_start_matches("./");
            if dir.is_empty() {
                relative.to_string()
            } else {
                format!("{}/{}", dir, relative)
            }
        }
    };

    if file_name(&path).is_empty() {
        None
    } else {
        Some(path)
    }
}

fn sort_newest_first(files: &mut [FileDescriptor]) {
    files.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.name.cmp(&b.name)));
}

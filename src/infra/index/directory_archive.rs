use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::index::{ArchivedReport, FileIndex, IndexError, ReportArchive};
use crate::core::reports::loader_service::MANIFEST_PATH;
use crate::core::reports::report_models::CURRENT_ALIASES;

/// Report archive laid out as the publishing job leaves it:
/// dated reports in `logs/`, the current aliases in `latest/` or at the root.
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    async fn read_report(&self, relative: String) -> Option<ArchivedReport> {
        let full = self.root.join(&relative);
        let content = match fs::read_to_string(&full).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %full.display(), error = %e, "Skipping unreadable report");
                return None;
            }
        };

        let name = relative.rsplit('/').next().unwrap_or(&relative).to_string();
        Some(ArchivedReport {
            name,
            path: relative,
            size: content.len() as u64,
            content,
        })
    }

    async fn logs_candidates(&self) -> Result<Vec<String>, IndexError> {
        let logs = self.root.join("logs");
        if !fs::try_exists(&logs).await? {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&logs).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                if name.ends_with(".txt") {
                    names.push(format!("logs/{}", name));
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl ReportArchive for DirectoryArchive {
    async fn scan(&self) -> Result<Vec<ArchivedReport>, IndexError> {
        if !fs::try_exists(&self.root).await? {
            return Err(IndexError::MissingArchive(self.root.display().to_string()));
        }

        let mut candidates = self.logs_candidates().await?;
        for dir in ["latest/", ""] {
            for alias in CURRENT_ALIASES {
                let relative = format!("{}{}", dir, alias);
                if fs::try_exists(self.root.join(&relative)).await? {
                    candidates.push(relative);
                }
            }
        }

        let mut reports = Vec::new();
        for relative in candidates {
            if let Some(report) = self.read_report(relative).await {
                reports.push(report);
            }
        }

        tracing::debug!(count = reports.len(), root = %self.root.display(), "Scanned report archive");
        Ok(reports)
    }

    async fn publish(&self, index: &FileIndex) -> Result<Vec<String>, IndexError> {
        let text = serde_json::to_string_pretty(index)?;

        let primary = self.root.join(MANIFEST_PATH);
        fs::write(&primary, &text).await?;

        let logs = self.root.join("logs");
        fs::create_dir_all(&logs).await?;
        let backup = logs.join(MANIFEST_PATH);
        fs::write(&backup, &text).await?;

        Ok(vec![
            primary.display().to_string(),
            backup.display().to_string(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::index::index_models::IndexedKind;
    use crate::core::index::IndexService;
    use crate::core::reports::Clock;
    use chrono::NaiveDate;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_scan_collects_logs_and_aliases() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "logs/20250816_email_summary_report.txt", "a");
        write(dir.path(), "logs/20250816_storytelling_summary.txt", "b");
        write(dir.path(), "logs/run.log", "ignored");
        write(dir.path(), "latest/today_email_summary_report.txt", "c");
        write(dir.path(), "executive_summary.txt", "d");

        let reports = DirectoryArchive::new(dir.path()).scan().await.unwrap();
        let paths: Vec<&str> = reports.iter().map(|r| r.path.as_str()).collect();

        assert_eq!(
            paths,
            vec![
                "logs/20250816_email_summary_report.txt",
                "logs/20250816_storytelling_summary.txt",
                "latest/today_email_summary_report.txt",
                "executive_summary.txt",
            ]
        );
        assert_eq!(reports[3].name, "executive_summary.txt");
        assert_eq!(reports[3].size, 1);
    }

    #[tokio::test]
    async fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let archive = DirectoryArchive::new(dir.path().join("nope"));
        assert!(matches!(
            archive.scan().await,
            Err(IndexError::MissingArchive(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_writes_manifest_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "logs/20250816_email_summary_report.txt", "older");
        write(dir.path(), "logs/20250817_storytelling_summary.txt", "story");

        let service = IndexService::new(
            DirectoryArchive::new(dir.path()),
            Clock::Fixed(NaiveDate::from_ymd_opt(2025, 8, 17).unwrap()),
        );
        let (index, written) = service.generate().await.unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(index.files[0].kind, IndexedKind::Storytelling);

        let primary = std::fs::read_to_string(dir.path().join("file_index.json")).unwrap();
        let backup = std::fs::read_to_string(dir.path().join("logs/file_index.json")).unwrap();
        assert_eq!(primary, backup);

        let parsed: FileIndex = serde_json::from_str(&primary).unwrap();
        assert_eq!(parsed, index);
        assert_eq!(parsed.total_files, 2);
    }
}

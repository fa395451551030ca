use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::core::reports::acceptance::derive_date;
use crate::core::reports::{format_size, Clock, ReportDate};

use super::index_models::{ArchivedReport, FileIndex, IndexedFile, IndexedKind};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Report archive not found at {0}")]
    MissingArchive(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode manifest: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage the manifest is generated from and written back to.
#[async_trait]
pub trait ReportArchive: Send + Sync {
    /// Every readable report file. Unreadable files are skipped, not reported.
    async fn scan(&self) -> Result<Vec<ArchivedReport>, IndexError>;

    /// Write the manifest and return where it ended up.
    async fn publish(&self, index: &FileIndex) -> Result<Vec<String>, IndexError>;
}

pub struct IndexService<A: ReportArchive> {
    archive: A,
    clock: Clock,
}

impl<A: ReportArchive> IndexService<A> {
    pub fn new(archive: A, clock: Clock) -> Self {
        Self { archive, clock }
    }

    pub async fn generate(&self) -> Result<(FileIndex, Vec<String>), IndexError> {
        let reports = self.archive.scan().await?;
        let index = build_index(reports, self.clock.today(), Local::now().to_rfc3339());
        let written = self.archive.publish(&index).await?;

        tracing::info!(
            total_files = index.total_files,
            locations = ?written,
            "Generated report manifest"
        );
        Ok((index, written))
    }
}

/// Describe every report, newest first. A name seen twice keeps its first occurrence.
pub fn build_index(reports: Vec<ArchivedReport>, today: NaiveDate, generated_at: String) -> FileIndex {
    let mut seen = HashSet::new();
    let mut dated: Vec<(ReportDate, IndexedFile)> = reports
        .into_iter()
        .filter(|report| seen.insert(report.name.clone()))
        .map(|report| {
            let date = derive_date(&report.name, today);
            let file = IndexedFile {
                kind: IndexedKind::from_name(&report.name),
                size: format_size(report.size as usize),
                date: date.to_string(),
                name: report.name,
                path: report.path,
                content: report.content,
            };
            (date, file)
        })
        .collect();

    dated.sort_by(|(a_date, a), (b_date, b)| b_date.cmp(a_date).then_with(|| a.name.cmp(&b.name)));
    let files: Vec<IndexedFile> = dated.into_iter().map(|(_, file)| file).collect();

    FileIndex {
        generated_at,
        total_files: files.len(),
        files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reports::loader_service::ManifestDocument;
    use std::sync::Mutex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 17).unwrap()
    }

    fn report(path: &str, content: &str) -> ArchivedReport {
        ArchivedReport {
            name: path.rsplit('/').next().unwrap().to_string(),
            path: path.to_string(),
            size: content.len() as u64,
            content: content.to_string(),
        }
    }

    struct MockArchive {
        reports: Vec<ArchivedReport>,
        published: Mutex<Option<FileIndex>>,
    }

    #[async_trait]
    impl ReportArchive for MockArchive {
        async fn scan(&self) -> Result<Vec<ArchivedReport>, IndexError> {
            Ok(self.reports.clone())
        }

        async fn publish(&self, index: &FileIndex) -> Result<Vec<String>, IndexError> {
            *self.published.lock().unwrap() = Some(index.clone());
            Ok(vec!["file_index.json".to_string()])
        }
    }

    #[test]
    fn test_build_index_describes_and_sorts() {
        let index = build_index(
            vec![
                report("logs/20250816_email_summary_report.txt", "older"),
                report("logs/20250817_storytelling_summary.txt", "story"),
                report("logs/notes.txt", ""),
                report("latest/executive_summary.txt", "exec"),
            ],
            today(),
            "2025-08-17T06:00:00+00:00".to_string(),
        );

        assert_eq!(index.total_files, 4);
        let names: Vec<&str> = index.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "20250817_storytelling_summary.txt",
                "executive_summary.txt",
                "20250816_email_summary_report.txt",
                "notes.txt",
            ]
        );

        assert_eq!(index.files[0].kind, IndexedKind::Storytelling);
        assert_eq!(index.files[1].kind, IndexedKind::Executive);
        assert_eq!(index.files[1].date, "2025-08-17");
        assert_eq!(index.files[2].size, "5.0 B");
        assert_eq!(index.files[3].date, "unknown");
        assert_eq!(index.files[3].size, "0 B");
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let index = build_index(
            vec![
                report("latest/today_email_summary_report.txt", "latest"),
                report("today_email_summary_report.txt", "root"),
            ],
            today(),
            String::new(),
        );

        assert_eq!(index.total_files, 1);
        assert_eq!(index.files[0].content, "latest");
    }

    #[test]
    fn test_manifest_is_readable_by_loader() {
        let index = build_index(
            vec![report("logs/20250817_email_summary_report.txt", "Hello")],
            today(),
            String::new(),
        );
        let json = serde_json::to_string(&index).unwrap();
        assert!(json.contains(r#""type":"summary""#));

        let document: ManifestDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(document.files[0].name, "20250817_email_summary_report.txt");
        assert_eq!(
            document.files[0].path.as_deref(),
            Some("logs/20250817_email_summary_report.txt")
        );
    }

    #[tokio::test]
    async fn test_generate_publishes_index() {
        let archive = MockArchive {
            reports: vec![report("logs/20250817_email_summary_report.txt", "Hello")],
            published: Mutex::new(None),
        };
        let service = IndexService::new(archive, Clock::Fixed(today()));

        let (index, written) = service.generate().await.unwrap();

        assert_eq!(written, vec!["file_index.json".to_string()]);
        assert_eq!(service.archive.published.lock().unwrap().as_ref(), Some(&index));
        assert!(!index.generated_at.is_empty());
    }
}

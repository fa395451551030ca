use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::core::reports::{FetchError, ReportSource};

/// Report source backed by a map of path to body. Directory listings are not
/// generated; store one under its directory path (`logs/`) when a test needs it.
pub struct InMemoryReportSource {
    files: DashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl InMemoryReportSource {
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_file(self, path: &str, body: &str) -> Self {
        self.insert(path, body);
        self
    }

    pub fn insert(&self, path: &str, body: &str) {
        self.files.insert(path.to_string(), body.to_string());
    }

    pub fn remove(&self, path: &str) {
        self.files.remove(path);
    }

    /// Every path fetched so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

impl Default for InMemoryReportSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportSource for InMemoryReportSource {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(path.to_string());
        }

        self.files
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_source() {
        let source = InMemoryReportSource::new().with_file("logs/a.txt", "alpha");

        assert_eq!(source.fetch_text("logs/a.txt").await.unwrap(), "alpha");
        assert!(source.fetch_text("logs/b.txt").await.unwrap_err().is_not_found());

        source.insert("logs/b.txt", "beta");
        assert_eq!(source.fetch_text("logs/b.txt").await.unwrap(), "beta");

        source.remove("logs/a.txt");
        assert!(source.fetch_text("logs/a.txt").await.is_err());

        assert_eq!(
            source.requests(),
            vec!["logs/a.txt", "logs/b.txt", "logs/b.txt", "logs/a.txt"]
        );
    }
}

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while fetching a single resource from a report source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Request for {path} failed: {message}")]
    Transport { path: String, message: String },
    #[error("Malformed {path}: {message}")]
    Malformed { path: String, message: String },
    #[error("Refusing to fetch {0}")]
    InvalidPath(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// Where report files are read from. Paths are relative to the source root
/// (`file_index.json`, `logs/`, `latest/today_email_summary_report.txt`).
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Fetch a resource as text. Directory paths return an HTML listing.
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError>;

    /// Human readable location for logs and the dashboard header.
    fn describe(&self) -> String;
}

// Lets the composition root pick an HTTP or local source at runtime.
#[async_trait]
impl ReportSource for Box<dyn ReportSource> {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        (**self).fetch_text(path).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

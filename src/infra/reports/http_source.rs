use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};

use crate::core::reports::{FetchError, ReportSource};

/// Reads reports from a static site, e.g. the GitHub Pages deployment of the report archive.
pub struct HttpReportSource {
    client: Client,
    base_url: String,
}

impl HttpReportSource {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "User-Agent",
            HeaderValue::from_static("SummaryDashboard/0.2"),
        );
        headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| FetchError::Transport {
                path: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: format!("{}/", base_url.trim_end_matches('/')),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ReportSource for HttpReportSource {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        if path.split('/').any(|segment| segment == "..") {
            return Err(FetchError::InvalidPath(path.to_string()));
        }

        let transport = |e: reqwest::Error| FetchError::Transport {
            path: path.to_string(),
            message: e.to_string(),
        };

        // Static hosts cache aggressively; the timestamp forces a fresh copy on every refresh.
        let resp = self
            .client
            .get(self.url_for(path))
            .query(&[("t", Utc::now().timestamp_millis().to_string())])
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Transport {
                path: path.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        resp.text().await.map_err(transport)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let source = HttpReportSource::new("https://example.github.io/email-summary-data/").unwrap();
        assert_eq!(
            source.url_for("logs/20250817_email_summary_report.txt"),
            "https://example.github.io/email-summary-data/logs/20250817_email_summary_report.txt"
        );
        assert_eq!(
            source.url_for("/file_index.json"),
            "https://example.github.io/email-summary-data/file_index.json"
        );

        let bare = HttpReportSource::new("http://localhost:8000").unwrap();
        assert_eq!(bare.url_for("logs/"), "http://localhost:8000/logs/");
        assert_eq!(bare.describe(), "http://localhost:8000/");
    }

    #[tokio::test]
    async fn test_parent_segments_rejected() {
        let source = HttpReportSource::new("http://localhost:8000").unwrap();
        let err = source.fetch_text("../secrets.txt").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidPath(_)));
    }
}

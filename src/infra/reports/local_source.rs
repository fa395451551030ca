use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::reports::{FetchError, ReportSource};

/// Reads reports straight from a directory.
///
/// Directory paths answer with a small HTML index, the way a static file server
/// would, so listing-based discovery works against a local checkout too.
pub struct LocalReportSource {
    root: PathBuf,
}

impl LocalReportSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(FetchError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    async fn render_listing(&self, dir: &Path, path: &str) -> Result<String, FetchError> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| io_error(path, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(path, e))? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            names.push(if is_dir { format!("{}/", name) } else { name });
        }
        names.sort();

        let mut html = format!(
            "<!DOCTYPE html>\n<html>\n<head><title>Index of /{}</title></head>\n<body>\n<ul>\n",
            path
        );
        for name in names {
            let href = match name.strip_suffix('/') {
                Some(dir_name) => format!("{}/", urlencoding::encode(dir_name)),
                None => urlencoding::encode(&name).into_owned(),
            };
            html.push_str(&format!("<li><a href=\"{}\">{}</a></li>\n", href, name));
        }
        html.push_str("</ul>\n</body>\n</html>\n");
        Ok(html)
    }
}

fn io_error(path: &str, err: std::io::Error) -> FetchError {
    match err.kind() {
        ErrorKind::NotFound => FetchError::NotFound(path.to_string()),
        ErrorKind::InvalidData => FetchError::Malformed {
            path: path.to_string(),
            message: err.to_string(),
        },
        _ => FetchError::Transport {
            path: path.to_string(),
            message: err.to_string(),
        },
    }
}

#[async_trait]
impl ReportSource for LocalReportSource {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let target = self.resolve(path)?;
        let metadata = fs::metadata(&target).await.map_err(|e| io_error(path, e))?;

        if metadata.is_dir() {
            return self.render_listing(&target, path).await;
        }
        fs::read_to_string(&target)
            .await
            .map_err(|e| io_error(path, e))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

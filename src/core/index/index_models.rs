use serde::{Deserialize, Serialize};

use crate::core::reports::ReportKind;

/// Category written to the manifest. Storytelling companions are listed too,
/// even though the dashboard never shows them as cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexedKind {
    Summary,
    Executive,
    Storytelling,
}

impl IndexedKind {
    pub fn from_name(name: &str) -> Self {
        if name.contains("storytelling") {
            return IndexedKind::Storytelling;
        }
        match ReportKind::from_name(name) {
            ReportKind::Summary => IndexedKind::Summary,
            ReportKind::Executive => IndexedKind::Executive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: IndexedKind,
    pub size: String,
    pub date: String,
    pub path: String,
    pub content: String,
}

/// `file_index.json` as published next to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIndex {
    pub generated_at: String,
    pub total_files: usize,
    pub files: Vec<IndexedFile>,
}

/// A report file found in the archive, before it is described for the manifest.
#[derive(Debug, Clone)]
pub struct ArchivedReport {
    pub name: String,
    /// Relative to the archive root, `/` separated.
    pub path: String,
    pub size: u64,
    pub content: String,
}

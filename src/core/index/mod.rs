pub mod index_models;
pub mod index_service;

pub use index_models::{ArchivedReport, FileIndex};
pub use index_service::{IndexError, IndexService, ReportArchive};

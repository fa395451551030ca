pub mod acceptance;
pub mod loader_service;
pub mod report_models;
pub mod report_source;

pub use acceptance::AcceptancePolicy;
pub use loader_service::{LoaderError, LoaderSettings, ReportLoader};
pub use report_models::{format_size, Clock, FileDescriptor, ReportDate, ReportKind};
pub use report_source::{FetchError, ReportSource};

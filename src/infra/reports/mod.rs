// Report source implementations.
// - `http_source.rs` reads a published static site.
// - `local_source.rs` reads a directory on disk.
// - `in_memory.rs` backs the tests.

pub mod http_source;
pub mod local_source;

#[cfg(test)]
pub mod in_memory;

pub use http_source::HttpReportSource;
#[cfg(test)]
pub use in_memory::InMemoryReportSource;
pub use local_source::LocalReportSource;

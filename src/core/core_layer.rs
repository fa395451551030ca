// The core module contains all dashboard logic.
// Nothing in here knows whether reports come over HTTP or from disk,
// or which program does the talking.

#[path = "reports/mod.rs"]
pub mod reports;

#[path = "narration/mod.rs"]
pub mod narration;

#[path = "dashboard/mod.rs"]
pub mod dashboard;

#[path = "index/mod.rs"]
pub mod index;

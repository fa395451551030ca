// The infra module contains implementations of core traits.
// Each concern gets its own submodule.

#[path = "reports/mod.rs"]
pub mod reports;

#[path = "speech/mod.rs"]
pub mod speech;

#[path = "index/mod.rs"]
pub mod index;

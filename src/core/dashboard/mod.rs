pub mod dashboard_models;
pub mod dashboard_service;
pub mod filters;

pub use dashboard_models::{DashboardStats, Tab, TypeFilter};
pub use dashboard_service::{DashboardService, DashboardSettings};

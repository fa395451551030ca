use std::fmt;
use std::str::FromStr;

use crate::core::reports::{ReportDate, ReportKind};

/// Date scope of the report list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Today,
    All,
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Tab::Today),
            "all" => Ok(Tab::All),
            other => Err(format!("unknown tab '{}' (expected today or all)", other)),
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tab::Today => f.write_str("today"),
            Tab::All => f.write_str("all"),
        }
    }
}

/// Report category scope of the report list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(ReportKind),
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "summary" => Ok(TypeFilter::Only(ReportKind::Summary)),
            "executive" => Ok(TypeFilter::Only(ReportKind::Executive)),
            other => Err(format!(
                "unknown type '{}' (expected all, summary or executive)",
                other
            )),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => f.write_str("all"),
            TypeFilter::Only(kind) => write!(f, "{}", kind),
        }
    }
}

/// Numbers in the dashboard header. Always derived from the working set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub today_count: usize,
    pub total_count: usize,
    /// `None` when no report carries a date.
    pub latest_date: Option<ReportDate>,
}

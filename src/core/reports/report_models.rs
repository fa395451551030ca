use std::fmt;

use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Name the publishing job gives the report for the current day.
pub const TODAY_REPORT_ALIAS: &str = "today_email_summary_report.txt";
/// Name the publishing job gives the current executive summary.
pub const EXECUTIVE_SUMMARY_ALIAS: &str = "executive_summary.txt";
/// Undated files that always describe "today".
pub const CURRENT_ALIASES: [&str; 2] = [TODAY_REPORT_ALIAS, EXECUTIVE_SUMMARY_ALIAS];

/// Category shown on a report card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Summary,
    Executive,
}

impl ReportKind {
    pub fn from_name(name: &str) -> Self {
        if name.contains("executive") {
            ReportKind::Executive
        } else {
            ReportKind::Summary
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Summary => "summary",
            ReportKind::Executive => "executive",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar date of a report.
///
/// `Unknown` orders before every real date, so it never wins a "latest date" comparison.
/// Real dates are kept as `YYYY-MM-DD` strings; string order is calendar order for that shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportDate {
    Unknown,
    Day(String),
}

impl ReportDate {
    pub fn from_day(day: NaiveDate) -> Self {
        ReportDate::Day(day.format("%Y-%m-%d").to_string())
    }

    /// Build from an 8 digit `YYYYMMDD` run.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(ReportDate::Day(format!(
            "{}-{}-{}",
            &digits[..4],
            &digits[4..6],
            &digits[6..]
        )))
    }

    pub fn is_known(&self) -> bool {
        matches!(self, ReportDate::Day(_))
    }

    pub fn is_on(&self, day: NaiveDate) -> bool {
        match self {
            ReportDate::Day(value) => *value == day.format("%Y-%m-%d").to_string(),
            ReportDate::Unknown => false,
        }
    }

    /// `YYYYMMDD` form used by companion file names.
    pub fn compact(&self) -> Option<String> {
        match self {
            ReportDate::Day(value) => Some(value.replace('-', "")),
            ReportDate::Unknown => None,
        }
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportDate::Day(value) => f.write_str(value),
            ReportDate::Unknown => f.write_str("unknown"),
        }
    }
}

/// One discoverable report. Built by the loader and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub kind: ReportKind,
    pub date: ReportDate,
    pub size_label: String,
    /// Location relative to the report source, used to fetch the file again.
    pub path: String,
    pub content: String,
}

/// Source of "today" for date derivation and the today tab.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    Local,
    Zone(Tz),
    #[cfg(test)]
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Local => Local::now().date_naive(),
            Clock::Zone(tz) => Utc::now().with_timezone(tz).date_naive(),
            #[cfg(test)]
            Clock::Fixed(day) => *day,
        }
    }
}

/// Human readable size, one decimal place in 1024 steps.
pub fn format_size(bytes: usize) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, UNITS[unit])
}

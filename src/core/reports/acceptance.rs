use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::report_models::{
    format_size, FileDescriptor, ReportDate, ReportKind, CURRENT_ALIASES,
};

// `\d` would also match non-ASCII digits, so the date runs are spelled `[0-9]`.
static DAILY_REPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{8}_email_summary_report\.txt$").expect("static regex compile")
});
static DATE_DIGITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{8}").expect("static regex compile"));

/// Decides which file names may enter the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptancePolicy {
    /// Dated daily reports plus the two "current" aliases.
    Strict,
    /// Any `.txt` file except storytelling companions.
    Permissive,
}

impl AcceptancePolicy {
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            AcceptancePolicy::Strict => {
                DAILY_REPORT_RE.is_match(name) || CURRENT_ALIASES.contains(&name)
            }
            AcceptancePolicy::Permissive => {
                name.ends_with(".txt") && !name.contains("storytelling")
            }
        }
    }
}

impl FromStr for AcceptancePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(AcceptancePolicy::Strict),
            "permissive" | "any" => Ok(AcceptancePolicy::Permissive),
            other => Err(format!(
                "unknown acceptance policy '{}' (expected strict or permissive)",
                other
            )),
        }
    }
}

impl fmt::Display for AcceptancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptancePolicy::Strict => f.write_str("strict"),
            AcceptancePolicy::Permissive => f.write_str("permissive"),
        }
    }
}

/// First 8 digit run anywhere in the name, else today for the current aliases.
pub fn derive_date(name: &str, today: NaiveDate) -> ReportDate {
    if let Some(found) = DATE_DIGITS_RE.find(name) {
        if let Some(date) = ReportDate::from_digits(found.as_str()) {
            return date;
        }
    }

    if CURRENT_ALIASES.contains(&name) {
        ReportDate::from_day(today)
    } else {
        ReportDate::Unknown
    }
}

/// Where a report lives when the source did not say: dated files sit under `logs/`.
pub fn default_path(name: &str, date: &ReportDate) -> String {
    if date.is_known() && !CURRENT_ALIASES.contains(&name) {
        format!("logs/{}", name)
    } else {
        name.to_string()
    }
}

/// Last path segment of a source path.
pub fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

/// Validate a candidate and normalize it into a descriptor.
///
/// Returns `None` when the policy rejects the name; rejected files never reach the working set.
pub fn parse_file_info(
    name: &str,
    content: String,
    path: Option<String>,
    policy: AcceptancePolicy,
    today: NaiveDate,
) -> Option<FileDescriptor> {
    if !policy.accepts(name) {
        tracing::debug!(name, %policy, "Rejected report file name");
        return None;
    }

    let date = derive_date(name, today);
    let path = path
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| default_path(name, &date));

    Some(FileDescriptor {
        name: name.to_string(),
        kind: ReportKind::from_name(name),
        size_label: format_size(content.len()),
        date,
        path,
        content,
    })
}

use chrono::{DateTime, Local};

use crate::core::dashboard::{DashboardService, DashboardStats, Tab, TypeFilter};
use crate::core::narration::{NarrationTarget, SpeechEngine, TriggerControl};
use crate::core::reports::{FileDescriptor, ReportSource};

const RULE: &str = "────────────────────────────────────────────────────────";

/// Full screen: header, stats, error banner, cards and the open report.
pub fn render_dashboard<S: ReportSource, E: SpeechEngine>(
    dashboard: &DashboardService<S, E>,
) -> String {
    let mut out = render_header(
        dashboard.source_label(),
        dashboard.last_refreshed(),
        &dashboard.stats(),
    );

    if let Some(error) = dashboard.load_error() {
        out.push_str(&render_error(error));
    }

    out.push_str(&render_filters(dashboard.tab(), dashboard.type_filter()));
    out.push_str(&render_control(
        "main",
        &dashboard.control(&NarrationTarget::Main),
    ));

    let visible = dashboard.visible();
    let cards: Vec<(&FileDescriptor, TriggerControl)> = visible
        .iter()
        .map(|file| {
            let control = dashboard.control(&NarrationTarget::Card(file.name.clone()));
            (*file, control)
        })
        .collect();
    out.push_str(&render_cards(&cards));

    if let Some(file) = dashboard.selected() {
        out.push_str(&render_detail(file));
    }
    out
}

pub fn render_header(
    source: &str,
    refreshed: Option<DateTime<Local>>,
    stats: &DashboardStats,
) -> String {
    let refreshed = refreshed
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let latest = stats
        .latest_date
        .as_ref()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{RULE}\n📬 Daily Summary Dashboard\n   source: {source}   refreshed: {refreshed}\n   📅 Today: {}   📁 Total: {}   🕒 Latest: {latest}\n{RULE}\n",
        stats.today_count, stats.total_count,
    )
}

pub fn render_error(message: &str) -> String {
    format!("❌ Could not load reports: {}\n", message)
}

pub fn render_filters(tab: Tab, filter: TypeFilter) -> String {
    format!("Tab: {}   Type: {}\n", tab, filter)
}

pub fn render_control(label: &str, control: &TriggerControl) -> String {
    format!("[{}] {} {}\n", label, control.icon, control.label)
}

/// One numbered line per card; numbers are what `open N` and `read N` refer to.
pub fn render_cards(cards: &[(&FileDescriptor, TriggerControl)]) -> String {
    if cards.is_empty() {
        return "No reports match the current filters.\n".to_string();
    }

    let mut out = String::new();
    for (i, (file, control)) in cards.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. 📄 {}  {:>8}  {}   {} {}\n",
            i + 1,
            file.date,
            file.size_label,
            file.name,
            control.icon,
            control.label,
        ));
    }
    out
}

pub fn render_detail(file: &FileDescriptor) -> String {
    format!(
        "{RULE}\n📄 {} ({}, {}, {})\n{RULE}\n{}\n{RULE}\n",
        file.name,
        file.kind,
        file.date,
        file.size_label,
        file.content.trim_end(),
    )
}

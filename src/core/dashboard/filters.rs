use chrono::NaiveDate;

use crate::core::reports::FileDescriptor;

use super::dashboard_models::{DashboardStats, Tab, TypeFilter};

pub fn matches_tab(file: &FileDescriptor, tab: Tab, today: NaiveDate) -> bool {
    match tab {
        Tab::Today => file.date.is_on(today),
        Tab::All => true,
    }
}

pub fn matches_type(file: &FileDescriptor, filter: TypeFilter) -> bool {
    match filter {
        TypeFilter::All => true,
        TypeFilter::Only(kind) => file.kind == kind,
    }
}

/// Both predicates must hold. Order in the working set is preserved.
pub fn apply_filters(
    files: &[FileDescriptor],
    tab: Tab,
    filter: TypeFilter,
    today: NaiveDate,
) -> Vec<&FileDescriptor> {
    files
        .iter()
        .filter(|file| matches_tab(file, tab, today) && matches_type(file, filter))
        .collect()
}

pub fn compute_stats(files: &[FileDescriptor], today: NaiveDate) -> DashboardStats {
    DashboardStats {
        today_count: files.iter().filter(|f| f.date.is_on(today)).count(),
        total_count: files.len(),
        latest_date: files
            .iter()
            .map(|f| &f.date)
            .filter(|date| date.is_known())
            .max()
            .cloned(),
    }
}

//! Chart-ready series from the grouped-by-title aggregation.

use crate::types::GroupedAppointments;

pub const DEFAULT_MAX_ITEMS: usize = 8;

pub const SERIES_LABEL: &str = "Duration (minutes)";

/// Bar colours, cycled when there are more bars than entries.
pub const PALETTE: [&str; 8] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBar {
    pub title: String,
    pub total_minutes: u64,
    pub color: &'static str,
}

/// Sort groups by total minutes, largest first, and keep at most `max_items`.
/// Ties keep the server's order.
pub fn prepare_chart_data(groups: &[GroupedAppointments], max_items: usize) -> Vec<ChartBar> {
    let mut sorted: Vec<&GroupedAppointments> = groups.iter().collect();
    sorted.sort_by(|a, b| b.total_duration.total_minutes.cmp(&a.total_duration.total_minutes));
    sorted
        .into_iter()
        .take(max_items)
        .enumerate()
        .map(|(i, group)| ChartBar {
            title: group.title.clone(),
            total_minutes: group.total_duration.total_minutes,
            color: PALETTE[i % PALETTE.len()],
        })
        .collect()
}

/// Axis tick: `2h`, `2h30m`.
pub fn format_tick(total_minutes: u64) -> String {
    let (hours, mins) = (total_minutes / 60, total_minutes % 60);
    if mins > 0 {
        format!("{hours}h{mins}m")
    } else {
        format!("{hours}h")
    }
}

/// Tooltip line: `Duration (minutes): 2h 30m`.
pub fn format_tooltip(total_minutes: u64) -> String {
    format!(
        "{SERIES_LABEL}: {}h {}m",
        total_minutes / 60,
        total_minutes % 60
    )
}

//! Time-per-title bar chart and its filter buttons.

use scheduler_core::chart::{format_tick, format_tooltip, prepare_chart_data, SERIES_LABEL};
use scheduler_core::{DateFilterKey, DateFilters, GroupedAppointments};

use super::theme::Theme;

pub const NO_APPOINTMENTS: &str = "No appointments scheduled yet";
pub const NO_TIME_DATA: &str = "No time data available";

const BAR: char = '█';

/// `[Today]  This Week  This Month  All`, the selected one bracketed.
pub fn render_filter_buttons(filters: &DateFilters, current: DateFilterKey, theme: &Theme) -> String {
    filters
        .iter()
        .map(|(key, filter)| {
            if key == current {
                theme.accent(&format!("[{}]", filter.label))
            } else {
                format!(" {} ", filter.label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Horizontal bars scaled so the largest group spans `width` cells.
pub fn render_chart(
    groups: &[GroupedAppointments],
    max_items: usize,
    width: usize,
    theme: &Theme,
) -> String {
    if groups.is_empty() {
        return theme.muted(NO_APPOINTMENTS);
    }
    let bars = prepare_chart_data(groups, max_items);
    let Some(widest) = bars.iter().map(|b| b.total_minutes).max().filter(|&m| m > 0) else {
        return theme.muted(NO_TIME_DATA);
    };
    let label_width = bars.iter().map(|b| b.title.chars().count()).max().unwrap_or(0);

    let mut lines = vec![theme.strong(SERIES_LABEL)];
    for bar in &bars {
        let cells = scaled(bar.total_minutes, widest, width);
        let padding = label_width - bar.title.chars().count();
        lines.push(format!(
            "{}{}  {} {}",
            bar.title,
            " ".repeat(padding),
            theme.bar(&BAR.to_string().repeat(cells), bar.color),
            format_tick(bar.total_minutes),
        ));
    }
    lines.join("\n")
}

/// Tooltip text for every bar, in chart order.
pub fn render_tooltips(groups: &[GroupedAppointments], max_items: usize) -> Vec<String> {
    prepare_chart_data(groups, max_items)
        .iter()
        .map(|bar| format!("{}: {}", bar.title, format_tooltip(bar.total_minutes)))
        .collect()
}

/// Cells for `value` out of `widest`; any non-zero value gets at least one.
fn scaled(value: u64, widest: u64, width: usize) -> usize {
    if value == 0 || widest == 0 || width == 0 {
        return 0;
    }
    let (value, widest) = (u128::from(value), u128::from(widest));
    let cells = (value * width as u128 + widest / 2) / widest;
    usize::try_from(cells).map_or(width, |cells| cells.clamp(1, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scheduler_core::{date_filters, TotalDuration};

    fn group(title: &str, minutes: u64) -> GroupedAppointments {
        GroupedAppointments {
            title: title.into(),
            appointments: Vec::new(),
            total_duration: TotalDuration {
                hours: minutes / 60,
                minutes: minutes % 60,
                total_minutes: minutes,
            },
        }
    }

    #[test]
    fn empty_states() {
        assert_eq!(render_chart(&[], 8, 20, &Theme::PLAIN), NO_APPOINTMENTS);
        assert_eq!(
            render_chart(&[group("Idle", 0)], 8, 20, &Theme::PLAIN),
            NO_TIME_DATA
        );
    }

    #[test]
    fn scaling_survives_huge_totals() {
        assert_eq!(scaled(u64::MAX, u64::MAX, 40), 40);
        assert_eq!(scaled(u64::MAX / 2, u64::MAX, 40), 20);
        assert_eq!(scaled(1, u64::MAX, 40), 1);
        assert_eq!(scaled(5, 10, 0), 0);
    }

    #[test]
    fn bars_are_sorted_and_scaled() {
        let groups = [group("Gym", 30), group("Meeting", 120), group("Lunch", 45)];
        let out = render_chart(&groups, 8, 8, &Theme::PLAIN);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], SERIES_LABEL);
        assert_eq!(lines[1], "Meeting  ████████ 2h");
        assert_eq!(lines[2], "Lunch    ███ 0h45m");
        assert_eq!(lines[3], "Gym      ██ 0h30m");
    }

    #[test]
    fn truncates_to_max_items() {
        let groups = [group("A", 10), group("B", 20), group("C", 30)];
        let out = render_chart(&groups, 2, 10, &Theme::PLAIN);
        assert_eq!(out.lines().count(), 3);
        assert!(!out.contains("A "));
    }

    #[test]
    fn tooltips_use_hours_and_minutes() {
        let tips = render_tooltips(&[group("Meeting", 95)], 8);
        assert_eq!(tips, vec!["Meeting: Duration (minutes): 1h 35m"]);
    }

    #[test]
    fn selected_filter_is_bracketed() {
        let filters = date_filters(NaiveDate::from_ymd_opt(2024, 5, 8).unwrap());
        let out = render_filter_buttons(&filters, DateFilterKey::Week, &Theme::PLAIN);
        assert_eq!(out, " Today  [This Week]  This Month   All ");
    }
}

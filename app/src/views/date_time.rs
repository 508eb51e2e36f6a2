use chrono::{DateTime, TimeZone, Utc};
use scheduler_core::chart::format_tick;
use scheduler_core::Appointment;

use super::theme::Theme;
use super::DisplayMode;

/// Date, time span, "Now" badge and task progress for one appointment.
///
/// Compact: `May 6 • 09:00-10:00 Now · 1/2 tasks`.
/// Full: `May 6  09:00 - 10:00 (1h)  Now` plus a `1/2 tasks completed` line.
pub fn render_date_time<Tz: TimeZone>(
    appointment: &Appointment,
    tz: &Tz,
    now: DateTime<Utc>,
    mode: DisplayMode,
    theme: &Theme,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let start = appointment.start.with_timezone(tz);
    let end = appointment.end.with_timezone(tz);
    let date = start.format("%b %-d").to_string();
    let (start_time, end_time) = (start.format("%H:%M"), end.format("%H:%M"));
    let badge = if appointment.is_current(now) {
        Some(theme.success("Now"))
    } else {
        None
    };
    let (done, total) = appointment.task_progress();

    match mode {
        DisplayMode::Compact => {
            let mut line = format!("{date} • {start_time}-{end_time}");
            if let Some(badge) = badge {
                line.push(' ');
                line.push_str(&badge);
            }
            if total > 0 {
                line.push_str(&theme.muted(&format!(" · {done}/{total} tasks")));
            }
            line
        }
        DisplayMode::Full => {
            let minutes = u64::try_from(appointment.duration().num_minutes()).unwrap_or(0);
            let mut out = format!("{date}  {start_time} - {end_time} ({})", format_tick(minutes));
            if let Some(badge) = badge {
                out.push_str("  ");
                out.push_str(&badge);
            }
            if total > 0 {
                out.push('\n');
                out.push_str(&theme.muted(&format!("{done}/{total} tasks completed")));
            }
            out
        }
    }
}

use chrono::{DateTime, TimeZone, Utc};
use scheduler_core::{Appointment, RecurrenceRule};

use super::date_time::render_date_time;
use super::layout::render_empty_state;
use super::theme::Theme;
use super::DisplayMode;

/// Render appointments in the order given (callers pass them sorted by start,
/// most recent first). An empty slice renders the empty state.
pub fn render_appointment_list<Tz: TimeZone>(
    appointments: &[&Appointment],
    tz: &Tz,
    now: DateTime<Utc>,
    mode: DisplayMode,
    theme: &Theme,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if appointments.is_empty() {
        return render_empty_state(theme);
    }
    let separator = match mode {
        DisplayMode::Compact => "\n",
        DisplayMode::Full => "\n\n",
    };
    appointments
        .iter()
        .map(|appointment| render_item(appointment, tz, now, mode, theme))
        .collect::<Vec<_>>()
        .join(separator)
}

fn render_item<Tz: TimeZone>(
    appointment: &Appointment,
    tz: &Tz,
    now: DateTime<Utc>,
    mode: DisplayMode,
    theme: &Theme,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let title = if appointment.is_current(now) {
        theme.success(&appointment.title)
    } else {
        theme.strong(&appointment.title)
    };
    let when = render_date_time(appointment, tz, now, mode, theme);
    let id = appointment.id.as_deref().unwrap_or("unsaved");

    match mode {
        DisplayMode::Compact => format!("{title}  {when}  {}", theme.muted(id)),
        DisplayMode::Full => {
            let mut out = format!("{title}  {}\n{when}", theme.muted(&format!("({id})")));
            if let Some(rule) = appointment.recurrence_rule.as_deref() {
                let label = rule
                    .parse::<RecurrenceRule>()
                    .map(|r| r.label())
                    .unwrap_or_else(|_| rule.to_string());
                out.push('\n');
                out.push_str(&theme.muted(&format!("↻ {label}")));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::layout::{EMPTY_STATE_HINT, EMPTY_STATE_TITLE};
    use scheduler_core::Agenda;

    fn appointment(id: &str, title: &str, day: u32) -> Appointment {
        let mut appt = Appointment::new(
            title,
            Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, day, 10, 0, 0).unwrap(),
        );
        appt.id = Some(id.into());
        appt
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 9, 15, 0).unwrap()
    }

    #[test]
    fn empty_list_shows_empty_state() {
        let out = render_appointment_list(&[], &Utc, now(), DisplayMode::Compact, &Theme::PLAIN);
        assert!(out.contains(EMPTY_STATE_TITLE));
        assert!(out.contains(EMPTY_STATE_HINT));
    }

    #[test]
    fn compact_lines_follow_agenda_order() {
        let agenda = Agenda::new(vec![
            appointment("a1", "Dentist", 6),
            appointment("a2", "Gym", 8),
        ]);
        let out = render_appointment_list(
            &agenda.sorted(),
            &Utc,
            now(),
            DisplayMode::Compact,
            &Theme::PLAIN,
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Gym  May 8 • 09:00-10:00  a2");
        assert_eq!(lines[1], "Dentist  May 6 • 09:00-10:00 Now  a1");
    }

    #[test]
    fn full_mode_shows_recurrence_label() {
        let mut appt = appointment("a1", "Standup", 6);
        appt.is_recurring = true;
        appt.recurrence_rule = Some("FREQ=WEEKLY;COUNT=3".into());
        let out = render_appointment_list(&[&appt], &Utc, now(), DisplayMode::Full, &Theme::PLAIN);
        assert_eq!(
            out,
            "Standup  (a1)\nMay 6  09:00 - 10:00 (1h)  Now\n↻ Weekly (3 occurrences)"
        );
    }
}

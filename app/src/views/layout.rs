//! Header, banners and the empty state.

use super::theme::Theme;

pub const APP_NAME: &str = "Appointment Scheduler";
pub const EMPTY_STATE_TITLE: &str = "No appointments";
pub const EMPTY_STATE_HINT: &str = "Get started by creating a new appointment.";

/// Navbar equivalent: app name and the two entry points.
pub fn render_header(theme: &Theme) -> String {
    format!(
        "{}   {}",
        theme.accent(APP_NAME),
        theme.muted("list · create")
    )
}

pub fn render_error_banner(message: &str, theme: &Theme) -> String {
    format!("{} {message}", theme.danger("Error!"))
}

pub fn render_success(message: &str, theme: &Theme) -> String {
    format!("{} {message}", theme.success("✓"))
}

pub fn render_disconnected(url: &str, theme: &Theme) -> String {
    format!(
        "{} Cannot reach the backend at {url}. Is it running?",
        theme.danger("✗")
    )
}

pub fn render_empty_state(theme: &Theme) -> String {
    format!(
        "{}\n{}",
        theme.strong(EMPTY_STATE_TITLE),
        theme.muted(EMPTY_STATE_HINT)
    )
}

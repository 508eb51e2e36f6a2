//! Terminal views. Every view renders to a `String`; printing is the
//! caller's job.

pub mod appointment_list;
pub mod chart;
pub mod date_time;
pub mod layout;
pub mod modal;
pub mod task_list;
pub mod theme;

pub use appointment_list::render_appointment_list;
pub use chart::{render_chart, render_filter_buttons, render_tooltips};
pub use date_time::render_date_time;
pub use layout::{
    render_disconnected, render_empty_state, render_error_banner, render_header, render_success,
};
pub use modal::confirm;
pub use task_list::render_task_list;
pub use theme::Theme;

/// How much of each appointment a list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// One line per appointment.
    #[default]
    Compact,
    /// Title, time block, task progress and recurrence.
    Full,
}

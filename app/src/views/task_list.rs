use scheduler_core::TaskListState;

use super::theme::Theme;

pub const NO_TASKS: &str = "No tasks for this appointment.";

/// One checkbox line per task. Tasks awaiting confirmation are marked.
pub fn render_task_list(state: &TaskListState, theme: &Theme) -> String {
    if state.tasks().is_empty() {
        return theme.muted(NO_TASKS);
    }
    state
        .tasks()
        .iter()
        .map(|task| {
            let id = task.id.as_deref().unwrap_or("?");
            let (checkbox, description) = if task.completed {
                ("[x]", theme.done(&task.description))
            } else {
                ("[ ]", task.description.clone())
            };
            let mut line = format!("{checkbox} {description}  {}", theme.muted(&format!("({id})")));
            if state.is_in_flight(id) {
                line.push_str(&theme.muted(" saving…"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

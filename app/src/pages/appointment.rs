use chrono::{DateTime, TimeZone, Utc};
use scheduler_core::form::edit_appointment;
use scheduler_core::{Ack, Appointment, Task, TaskDraft, TaskListState, TaskUpdateMode};
use tracing::debug;

use super::appointment_id;
use crate::error::{AppError, Result};
use crate::service::AppointmentService;
use crate::task_toggle::TaskToggle;
use crate::views::{self, DisplayMode, Theme};

/// One appointment with its editable task list.
#[derive(Debug, Clone)]
pub struct AppointmentPage {
    appointment: Appointment,
    tasks: TaskListState,
}

impl AppointmentPage {
    pub async fn load(service: &AppointmentService, id: &str) -> Result<Self> {
        let appointment = service.get_appointment(id).await?;
        Ok(Self::from_appointment(appointment))
    }

    pub fn from_appointment(appointment: Appointment) -> Self {
        let tasks = TaskListState::new(appointment.tasks.clone());
        Self { appointment, tasks }
    }

    pub fn appointment(&self) -> &Appointment {
        &self.appointment
    }

    pub fn tasks(&self) -> &TaskListState {
        &self.tasks
    }

    /// Apply the given field edits; unspecified fields keep their values and
    /// the merged interval must still satisfy `start < end`.
    pub async fn edit(
        &mut self,
        service: &AppointmentService,
        title: Option<String>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<&Appointment> {
        let id = appointment_id(&self.appointment)?;
        let patch = edit_appointment(&self.appointment, title, start, end)?;
        let updated = service.update_appointment(&id, &patch).await?;
        self.tasks.set_tasks(updated.tasks.clone());
        self.appointment = updated;
        Ok(&self.appointment)
    }

    pub async fn delete(self, service: &AppointmentService, all_recurring: bool) -> Result<Ack> {
        let id = appointment_id(&self.appointment)?;
        Ok(service.delete_appointment(&id, all_recurring).await?)
    }

    pub async fn add_task(&mut self, service: &AppointmentService, draft: TaskDraft) -> Result<Task> {
        let id = appointment_id(&self.appointment)?;
        let input = draft.into_new_task()?;
        let task = service.add_task(&id, &input).await?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub async fn set_task_completed<F>(
        &mut self,
        service: &AppointmentService,
        task_id: &str,
        completed: bool,
        mode: TaskUpdateMode,
        on_change: F,
    ) -> Result<Task>
    where
        F: FnMut(&[Task]),
    {
        let id = appointment_id(&self.appointment)?;
        let task = TaskToggle::new(service)
            .mode(mode)
            .set_completed(&id, &mut self.tasks, task_id, completed, on_change)
            .await?;
        Ok(task)
    }

    /// Delete a task; the list keeps it until the server confirms.
    pub async fn remove_task(&mut self, service: &AppointmentService, task_id: &str) -> Result<()> {
        let id = appointment_id(&self.appointment)?;
        self.tasks.lock(task_id)?;
        let result = service.delete_task(&id, task_id).await;
        self.tasks.unlock(task_id);
        result?;
        self.tasks.remove(task_id);
        debug!(appointment_id = %id, task_id, "task removed");
        Ok(())
    }

    pub async fn task(&self, service: &AppointmentService, task_id: &str) -> Result<Task> {
        let id = appointment_id(&self.appointment)?;
        if !self.tasks.tasks().iter().any(|t| t.id.as_deref() == Some(task_id)) {
            return Err(AppError::TaskNotFound {
                appointment_id: id,
                task_id: task_id.to_string(),
            });
        }
        Ok(service.get_task(&id, task_id).await?)
    }

    pub fn render<Tz: TimeZone>(&self, tz: &Tz, now: DateTime<Utc>, theme: &Theme) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut current = self.appointment.clone();
        current.tasks = self.tasks.tasks().to_vec();

        let mut out = views::render_appointment_list(&[&current], tz, now, DisplayMode::Full, theme);
        if let Some(series) = current.recurrence_id.as_deref() {
            out.push_str(&theme.muted(&format!("\nseries: {series}")));
        }
        out.push_str("\n\n");
        out.push_str(&theme.heading("Tasks"));
        out.push('\n');
        out.push_str(&views::render_task_list(&self.tasks, theme));
        out
    }
}

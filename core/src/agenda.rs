//! In-memory appointment list held by a page.
//!
//! The agenda is never persisted; it mirrors the last server answer and is
//! mutated only by its page after a call completes.

use chrono::TimeZone;

use crate::date_filter::DateFilter;
use crate::types::{Appointment, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Agenda {
    appointments: Vec<Appointment>,
}

impl Agenda {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        Self { appointments }
    }

    pub fn as_slice(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn len(&self) -> usize {
        self.appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appointments.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id.as_deref() == Some(id))
    }

    /// Most recent start first.
    pub fn sorted(&self) -> Vec<&Appointment> {
        let mut sorted: Vec<&Appointment> = self.appointments.iter().collect();
        sorted.sort_by(|a, b| b.start.cmp(&a.start));
        sorted
    }

    /// Appointments whose start falls inside `filter`, read in `tz`.
    pub fn filtered<Tz: TimeZone>(&self, filter: &DateFilter, tz: &Tz) -> Vec<&Appointment> {
        self.sorted()
            .into_iter()
            .filter(|a| filter.contains(a.start, tz))
            .collect()
    }

    pub fn push(&mut self, appointment: Appointment) {
        self.appointments.push(appointment);
    }

    /// Swap in a server-confirmed version of an appointment already listed.
    /// Returns false when no appointment with that id is present.
    pub fn replace(&mut self, appointment: Appointment) -> bool {
        let Some(id) = appointment.id.clone() else {
            return false;
        };
        match self
            .appointments
            .iter_mut()
            .find(|a| a.id.as_deref() == Some(id.as_str()))
        {
            Some(slot) => {
                *slot = appointment;
                true
            }
            None => false,
        }
    }

    /// Remove exactly the appointment with `id`.
    pub fn remove(&mut self, id: &str) -> Option<Appointment> {
        let index = self
            .appointments
            .iter()
            .position(|a| a.id.as_deref() == Some(id))?;
        Some(self.appointments.remove(index))
    }

    /// Remove the appointment with `id` and every member of its series.
    /// Returns the number of appointments removed.
    pub fn remove_series(&mut self, id: &str) -> usize {
        let series = self
            .get(id)
            .and_then(|a| a.series_id())
            .unwrap_or(id)
            .to_string();
        let before = self.appointments.len();
        self.appointments.retain(|a| {
            a.id.as_deref() != Some(id)
                && a.id.as_deref() != Some(series.as_str())
                && a.recurrence_id.as_deref() != Some(series.as_str())
        });
        before - self.appointments.len()
    }

    /// Append `task` to the appointment with `appointment_id` only.
    pub fn append_task(&mut self, appointment_id: &str, task: Task) -> bool {
        match self
            .appointments
            .iter_mut()
            .find(|a| a.id.as_deref() == Some(appointment_id))
        {
            Some(appointment) => {
                appointment.tasks.push(task);
                true
            }
            None => false,
        }
    }
}

//! Client-side form validation.
//!
//! Only required-field presence and `start < end` are checked here; every
//! other rule is the backend's.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::types::{Appointment, AppointmentPatch, NewTask};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    EmptyTitle,
    #[error("End time must be after start time")]
    EndNotAfterStart,
    #[error("Task description cannot be empty")]
    EmptyDescription,
    #[error("Nothing to update")]
    NoChanges,
}

/// Appointment form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AppointmentDraft {
    /// Blank form: starts at `now`, lasts one hour.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            title: String::new(),
            start: now,
            end: now + Duration::hours(1),
        }
    }

    /// Form pre-filled from an existing appointment.
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            title: appointment.title.clone(),
            start: appointment.start,
            end: appointment.end,
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::EmptyTitle);
        }
        if self.start >= self.end {
            return Err(FormError::EndNotAfterStart);
        }
        Ok(())
    }

    /// Validated create payload.
    pub fn into_appointment(self) -> Result<Appointment, FormError> {
        self.validate()?;
        Ok(Appointment::new(self.title.trim(), self.start, self.end))
    }

    /// Validated update payload carrying the whole form.
    pub fn into_patch(self) -> Result<AppointmentPatch, FormError> {
        self.validate()?;
        Ok(AppointmentPatch {
            title: Some(self.title.trim().to_string()),
            start: Some(self.start),
            end: Some(self.end),
            ..AppointmentPatch::default()
        })
    }
}

/// Apply optional edits on top of an existing appointment and validate the
/// result, so a partial edit cannot produce `start >= end`.
pub fn edit_appointment(
    current: &Appointment,
    title: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<AppointmentPatch, FormError> {
    if title.is_none() && start.is_none() && end.is_none() {
        return Err(FormError::NoChanges);
    }
    let mut draft = AppointmentDraft::from_appointment(current);
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(start) = start {
        draft.start = start;
    }
    if let Some(end) = end {
        draft.end = end;
    }
    draft.into_patch()
}

/// Task form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub description: String,
}

impl TaskDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    pub fn into_new_task(self) -> Result<NewTask, FormError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(FormError::EmptyDescription);
        }
        Ok(NewTask {
            description: description.to_string(),
            completed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, h, 0, 0).unwrap()
    }

    #[test]
    fn blank_form_lasts_one_hour() {
        let draft = AppointmentDraft::starting_at(at(9));
        assert_eq!(draft.end - draft.start, Duration::hours(1));
        assert_eq!(draft.validate(), Err(FormError::EmptyTitle));
    }

    #[test]
    fn rejects_end_before_or_equal_start() {
        let mut draft = AppointmentDraft {
            title: "Meeting".into(),
            start: at(10),
            end: at(10),
        };
        assert_eq!(draft.validate(), Err(FormError::EndNotAfterStart));
        draft.end = at(9);
        assert_eq!(draft.validate(), Err(FormError::EndNotAfterStart));
    }

    #[test]
    fn valid_draft_becomes_unsaved_appointment() {
        let draft = AppointmentDraft {
            title: "  Meeting ".into(),
            start: at(10),
            end: at(11),
        };
        let appt = draft.into_appointment().unwrap();
        assert_eq!(appt.title, "Meeting");
        assert!(appt.id.is_none());
    }

    #[test]
    fn whitespace_title_is_empty() {
        let draft = AppointmentDraft {
            title: "   ".into(),
            start: at(10),
            end: at(11),
        };
        assert_eq!(draft.into_appointment(), Err(FormError::EmptyTitle));
    }

    #[test]
    fn partial_edit_is_checked_against_current_values() {
        let current = Appointment::new("Call", at(10), at(11));
        assert_eq!(
            edit_appointment(&current, None, Some(at(12)), None),
            Err(FormError::EndNotAfterStart)
        );
        let patch = edit_appointment(&current, None, Some(at(9)), None).unwrap();
        assert_eq!(patch.start, Some(at(9)));
        assert_eq!(patch.end, Some(at(11)));
        assert_eq!(
            edit_appointment(&current, None, None, None),
            Err(FormError::NoChanges)
        );
    }

    #[test]
    fn task_description_is_trimmed_and_required() {
        assert_eq!(
            TaskDraft::new("  ").into_new_task(),
            Err(FormError::EmptyDescription)
        );
        let task = TaskDraft::new(" Book room ").into_new_task().unwrap();
        assert_eq!(task.description, "Book room");
        assert!(!task.completed);
    }
}

//! Domain DTOs for the appointment API.
//!
//! # Design
//! These types mirror the backend's JSON schema (camelCase fields, `_id`
//! identifiers) but are defined independently of the mock-server crate;
//! integration tests catch schema drift. Timestamps are `DateTime<Utc>` at
//! this boundary; human-facing parsing and formatting live in the
//! presentation layer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A titled time interval, optionally recurring, optionally holding tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Appointment {
    /// A not-yet-persisted, non-recurring appointment without tasks.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.into(),
            start,
            end,
            is_recurring: false,
            recurrence_rule: None,
            recurrence_id: None,
            original_start: None,
            tasks: Vec::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether `now` falls inside the appointment, both ends inclusive.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }

    /// `(completed, total)` task counts.
    pub fn task_progress(&self) -> (usize, usize) {
        let done = self.tasks.iter().filter(|t| t.completed).count();
        (done, self.tasks.len())
    }

    /// Identifier shared by every member of this appointment's series: its
    /// `recurrence_id`, or its own id when it heads the series.
    pub fn series_id(&self) -> Option<&str> {
        self.recurrence_id.as_deref().or(self.id.as_deref())
    }
}

/// A boolean-completable item nested under exactly one appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Request payload for adding a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Partial update for an appointment. Only the fields present are sent;
/// omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
}

impl AppointmentPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Partial update for a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            description: None,
            completed: Some(completed),
        }
    }
}

/// Server-computed total duration of a title group.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TotalDuration {
    pub hours: u64,
    pub minutes: u64,
    pub total_minutes: u64,
}

/// One entry of the grouped-by-title aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupedAppointments {
    pub title: String,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    pub total_duration: TotalDuration,
}

/// Body of `POST /appointments/{id}/recurrence`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceRequest {
    pub rule: String,
}

/// Acknowledgement returned by delete endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, h, m, 0).unwrap()
    }

    #[test]
    fn appointment_uses_backend_field_names() {
        let mut appt = Appointment::new("Standup", at(9, 0), at(9, 15));
        appt.id = Some("a1".into());
        appt.recurrence_id = Some("a1".into());
        let json = serde_json::to_value(&appt).unwrap();
        assert_eq!(json["_id"], "a1");
        assert_eq!(json["recurrenceId"], "a1");
        assert_eq!(json["isRecurring"], false);
        assert_eq!(json["start"], "2024-05-06T09:00:00Z");
        assert!(json.get("recurrenceRule").is_none());
    }

    #[test]
    fn unsaved_appointment_omits_id() {
        let appt = Appointment::new("Gym", at(7, 0), at(8, 0));
        let json = serde_json::to_value(&appt).unwrap();
        assert!(json.get("_id").is_none());
    }

    #[test]
    fn appointment_defaults_missing_optional_fields() {
        let appt: Appointment = serde_json::from_str(
            r#"{"_id":"x","title":"Lunch","start":"2024-05-06T12:00:00.000Z","end":"2024-05-06T13:00:00.000Z"}"#,
        )
        .unwrap();
        assert!(!appt.is_recurring);
        assert!(appt.tasks.is_empty());
        assert_eq!(appt.duration(), Duration::hours(1));
    }

    #[test]
    fn task_completed_defaults_to_false() {
        let task: Task = serde_json::from_str(r#"{"_id":"t1","description":"Notes"}"#).unwrap();
        assert!(!task.completed);
    }

    #[test]
    fn task_rejects_missing_description() {
        let result: Result<Task, _> = serde_json::from_str(r#"{"_id":"t1","completed":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn is_current_includes_both_ends() {
        let appt = Appointment::new("Call", at(10, 0), at(11, 0));
        assert!(appt.is_current(at(10, 0)));
        assert!(appt.is_current(at(11, 0)));
        assert!(!appt.is_current(at(11, 1)));
    }

    #[test]
    fn task_progress_counts_completed() {
        let mut appt = Appointment::new("Review", at(10, 0), at(11, 0));
        appt.tasks = vec![
            Task { id: None, description: "a".into(), completed: true },
            Task { id: None, description: "b".into(), completed: false },
        ];
        assert_eq!(appt.task_progress(), (1, 2));
    }

    #[test]
    fn series_id_prefers_recurrence_id() {
        let mut appt = Appointment::new("Class", at(10, 0), at(11, 0));
        appt.id = Some("child".into());
        assert_eq!(appt.series_id(), Some("child"));
        appt.recurrence_id = Some("parent".into());
        assert_eq!(appt.series_id(), Some("parent"));
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = AppointmentPatch {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Renamed"}));
        assert!(AppointmentPatch::default().is_empty());
    }

    #[test]
    fn grouped_response_parses_duration() {
        let group: GroupedAppointments = serde_json::from_str(
            r#"{"title":"Work","appointments":[],"totalDuration":{"hours":2,"minutes":30,"totalMinutes":150}}"#,
        )
        .unwrap();
        assert_eq!(group.total_duration.total_minutes, 150);
    }
}

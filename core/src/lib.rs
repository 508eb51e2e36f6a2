//! Sans-IO core for the appointment scheduler client.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The host executes the actual
//! HTTP round-trip, owns timeouts and retries, and renders the results; this
//! crate stays deterministic and testable.
//!
//! # Design
//! - `AppointmentClient` is stateless: a base URL and the update verb.
//! - Each REST operation is split into `build_*` (produces a request) and
//!   `parse_*` (consumes a response), so the I/O boundary is explicit.
//! - Everything the pages compute locally lives here too: date windows,
//!   chart series, the in-memory agenda, the optimistic task-list state and
//!   form validation.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod agenda;
pub mod chart;
pub mod client;
pub mod date_filter;
pub mod error;
pub mod form;
pub mod http;
pub mod query;
pub mod recurrence;
pub mod tasks;
pub mod types;

pub use agenda::Agenda;
pub use client::{verify_task_identity, AppointmentClient, UpdateMethod};
pub use date_filter::{date_filters, DateFilter, DateFilterKey, DateFilters};
pub use error::ApiError;
pub use form::{AppointmentDraft, FormError, TaskDraft};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{AppointmentQuery, DateRange};
pub use recurrence::{Frequency, RecurrenceRule, RuleParseError};
pub use tasks::{PendingUpdate, RetryPolicy, TaskListState, TaskUpdateError, TaskUpdateMode};
pub use types::{
    Ack, Appointment, AppointmentPatch, GroupedAppointments, NewTask, RecurrenceRequest, Task,
    TaskPatch, TotalDuration,
};

//! Error type for the scheduler CLI.

use scheduler_core::{ApiError, FormError, RuleParseError, TaskUpdateError};
use thiserror::Error;

use crate::input::InputError;
use crate::task_toggle::ToggleError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Invalid recurrence rule: {0}")]
    Rule(#[from] RuleParseError),

    #[error(transparent)]
    Task(#[from] TaskUpdateError),

    #[error(transparent)]
    Toggle(#[from] ToggleError),

    #[error(transparent)]
    Input(#[from] InputError),

    /// The server returned an appointment without `_id`.
    #[error("Appointment {title:?} has no id")]
    MissingId { title: String },

    #[error("Task {task_id} not found on appointment {appointment_id}")]
    TaskNotFound {
        appointment_id: String,
        task_id: String,
    },

    #[error("{id} is not an instance of series {series_id}")]
    NotInSeries { series_id: String, id: String },

    #[error("Cannot reach the backend at {url}")]
    Disconnected { url: String },

    #[error("Cancelled")]
    Cancelled,

    #[error("Failed to read confirmation: {0}")]
    Prompt(#[from] std::io::Error),
}

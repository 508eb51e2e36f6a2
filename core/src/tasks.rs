//! Task-list state for the optimistic completion toggle.
//!
//! # Design
//! The network side lives in the host; this module owns the pure parts of the
//! flow so they can be tested without a runtime:
//! - `TaskListState::begin` applies the change, marks the task in flight and
//!   returns a `PendingUpdate` holding the pre-update snapshot.
//! - `confirm` swaps in the server's task; `rollback` restores the snapshot.
//!   Both clear the in-flight mark.
//! - `RetryPolicy` gives the backoff schedule between confirmation attempts.

use std::collections::BTreeSet;
use std::time::Duration;

use thiserror::Error;

use crate::error::ApiError;
use crate::types::Task;

pub const NETWORK_FAILURE_MESSAGE: &str =
    "Failed to update task due to network problems. Please check your connection.";
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to update task. Please try again.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskUpdateError {
    #[error("task {0} is not in this list")]
    UnknownTask(String),
    #[error("an update for task {0} is already in progress")]
    InFlight(String),
}

/// How a task list applies completion changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskUpdateMode {
    /// Show the change immediately, confirm in the background, roll back on
    /// failure.
    #[default]
    Optimistic,
    /// Wait for the server, then refresh from it.
    ConfirmThenRefresh,
}

/// Token for an applied-but-unconfirmed change.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending update must be confirmed or rolled back"]
pub struct PendingUpdate {
    pub task_id: String,
    pub completed: bool,
    snapshot: Vec<Task>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListState {
    tasks: Vec<Task>,
    in_flight: BTreeSet<String>,
}

impl TaskListState {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            in_flight: BTreeSet::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_in_flight(&self, task_id: &str) -> bool {
        self.in_flight.contains(task_id)
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn remove(&mut self, task_id: &str) -> Option<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id.as_deref() == Some(task_id))?;
        Some(self.tasks.remove(index))
    }

    /// Swap in a server copy of a listed task. In-flight marks are kept.
    pub fn replace(&mut self, task: Task) -> bool {
        let Some(id) = task.id.as_deref() else {
            return false;
        };
        match self.tasks.iter_mut().find(|t| t.id.as_deref() == Some(id)) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }

    /// Replace the whole list after a refresh from the server.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Mark `task_id` in flight without changing it (non-optimistic mode and
    /// deletes).
    pub fn lock(&mut self, task_id: &str) -> Result<(), TaskUpdateError> {
        if !self.tasks.iter().any(|t| t.id.as_deref() == Some(task_id)) {
            return Err(TaskUpdateError::UnknownTask(task_id.to_string()));
        }
        if !self.in_flight.insert(task_id.to_string()) {
            return Err(TaskUpdateError::InFlight(task_id.to_string()));
        }
        Ok(())
    }

    pub fn unlock(&mut self, task_id: &str) {
        self.in_flight.remove(task_id);
    }

    /// Apply `completed` to the task right away and remember how to undo it.
    pub fn begin(&mut self, task_id: &str, completed: bool) -> Result<PendingUpdate, TaskUpdateError> {
        let snapshot = self.tasks.clone();
        self.lock(task_id)?;
        if let Some(task) = self
            .tasks
            .iter_mut()
            .find(|t| t.id.as_deref() == Some(task_id))
        {
            task.completed = completed;
        }
        tracing::debug!(task_id, completed, "applied optimistic task update");
        Ok(PendingUpdate {
            task_id: task_id.to_string(),
            completed,
            snapshot,
        })
    }

    /// Replace the optimistic task with the server-confirmed one.
    pub fn confirm(&mut self, pending: PendingUpdate, confirmed: Task) {
        if let Some(task) = self
            .tasks
            .iter_mut()
            .find(|t| t.id.as_deref() == Some(pending.task_id.as_str()))
        {
            *task = confirmed;
        }
        self.in_flight.remove(&pending.task_id);
    }

    /// Restore the list as it was before `begin`.
    pub fn rollback(&mut self, pending: PendingUpdate) {
        tracing::debug!(task_id = %pending.task_id, "rolling back task update");
        self.tasks = pending.snapshot;
        self.in_flight.remove(&pending.task_id);
    }
}

/// Exponential backoff between confirmation attempts:
/// `base_delay × 2^attempt` after failed attempt `attempt` (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt`, or `None` when the budget
    /// is spent.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        Some(self.base_delay.saturating_mul(1u32 << attempt.min(16)))
    }
}

/// User-facing message for an update that failed after every retry.
pub fn failure_message(err: &ApiError) -> &'static str {
    if err.is_connectivity() {
        NETWORK_FAILURE_MESSAGE
    } else {
        GENERIC_FAILURE_MESSAGE
    }
}

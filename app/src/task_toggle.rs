//! Task completion toggle.
//!
//! # Design
//! In `Optimistic` mode the change is applied to the in-memory list and
//! reported through `on_change` before any request goes out. Confirmation is
//! retried with exponential backoff (`RetryPolicy`); when every attempt
//! fails the pre-update snapshot is restored and reported again.
//!
//! In `ConfirmThenRefresh` mode the task is only locked while the update is
//! confirmed, then the list is refreshed from the appointment.
//!
//! A 2xx response that does not describe the requested task counts as a
//! failed attempt.

use scheduler_core::tasks::failure_message;
use scheduler_core::{
    verify_task_identity, ApiError, RetryPolicy, Task, TaskListState, TaskPatch, TaskUpdateError,
    TaskUpdateMode,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::service::AppointmentService;

#[derive(Debug, Error)]
pub enum ToggleError {
    #[error(transparent)]
    Rejected(#[from] TaskUpdateError),
    /// Every confirmation attempt failed; `message` is the user-facing text.
    #[error("{message}")]
    Failed {
        message: &'static str,
        #[source]
        source: ApiError,
    },
}

impl ToggleError {
    fn failed(source: ApiError) -> Self {
        ToggleError::Failed {
            message: failure_message(&source),
            source,
        }
    }
}

pub struct TaskToggle<'a> {
    service: &'a AppointmentService,
    mode: TaskUpdateMode,
    policy: RetryPolicy,
}

impl<'a> TaskToggle<'a> {
    pub fn new(service: &'a AppointmentService) -> Self {
        Self {
            service,
            mode: TaskUpdateMode::default(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn mode(mut self, mode: TaskUpdateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set `completed` on `task_id`, reporting every visible change of the
    /// list through `on_change`. Returns the server's copy of the task.
    pub async fn set_completed<F>(
        &self,
        appointment_id: &str,
        state: &mut TaskListState,
        task_id: &str,
        completed: bool,
        mut on_change: F,
    ) -> Result<Task, ToggleError>
    where
        F: FnMut(&[Task]),
    {
        match self.mode {
            TaskUpdateMode::Optimistic => {
                let pending = state.begin(task_id, completed)?;
                on_change(state.tasks());
                match self.confirm(appointment_id, task_id, completed).await {
                    Ok(task) => {
                        state.confirm(pending, task.clone());
                        on_change(state.tasks());
                        Ok(task)
                    }
                    Err(err) => {
                        state.rollback(pending);
                        on_change(state.tasks());
                        Err(ToggleError::failed(err))
                    }
                }
            }
            TaskUpdateMode::ConfirmThenRefresh => {
                state.lock(task_id)?;
                let result = self.confirm(appointment_id, task_id, completed).await;
                state.unlock(task_id);
                let task = result.map_err(ToggleError::failed)?;
                match self.service.get_appointment(appointment_id).await {
                    Ok(appointment) => state.set_tasks(appointment.tasks),
                    Err(err) => {
                        warn!(appointment_id, error = %err, "refresh after task update failed");
                        state.replace(task.clone());
                    }
                }
                on_change(state.tasks());
                Ok(task)
            }
        }
    }

    async fn confirm(
        &self,
        appointment_id: &str,
        task_id: &str,
        completed: bool,
    ) -> Result<Task, ApiError> {
        let patch = TaskPatch::completed(completed);
        let mut attempt = 0;
        loop {
            let result = self
                .service
                .update_task(appointment_id, task_id, &patch)
                .await
                .and_then(|task| {
                    verify_task_identity(appointment_id, task_id, &task)?;
                    Ok(task)
                });
            match result {
                Ok(task) => {
                    debug!(task_id, completed, attempt, "task update confirmed");
                    return Ok(task);
                }
                Err(err) => match self.policy.delay_after(attempt) {
                    Some(delay) => {
                        warn!(task_id, attempt, ?delay, error = %err, "task update failed, retrying");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        warn!(task_id, attempts = attempt + 1, error = %err, "task update failed");
                        return Err(err);
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Fetcher;
    use crate::testing::{service, Scripted, ScriptedTransport, APPOINTMENT, BASE_URL};
    use scheduler_core::tasks::{GENERIC_FAILURE_MESSAGE, NETWORK_FAILURE_MESSAGE};
    use scheduler_core::{Appointment, AppointmentClient};
    use std::time::Duration;
    use tokio::time::Instant;

    fn initial_state() -> TaskListState {
        let appointment: Appointment = serde_json::from_str(APPOINTMENT).unwrap();
        TaskListState::new(appointment.tasks)
    }

    const T1_DONE: &str = r#"{"_id":"t1","description":"Bring card","completed":true}"#;

    #[tokio::test(start_paused = true)]
    async fn optimistic_change_is_visible_then_confirmed() {
        let transport = ScriptedTransport::new(vec![Scripted::json(200, T1_DONE)]);
        let svc = service(transport.clone());
        let mut state = initial_state();
        let mut seen = Vec::new();

        let task = TaskToggle::new(&svc)
            .set_completed("a1", &mut state, "t1", true, |tasks| {
                seen.push(tasks[0].completed)
            })
            .await
            .unwrap();

        assert!(task.completed);
        assert_eq!(seen, vec![true, true]);
        assert!(!state.is_in_flight("t1"));
        assert_eq!(transport.requests()[0].body.as_deref(), Some(r#"{"completed":true}"#));
    }

    #[tokio::test(start_paused = true)]
    async fn rolls_back_after_three_failed_attempts() {
        let transport = ScriptedTransport::new(vec![
            Scripted::Fail("reset"),
            Scripted::Fail("reset"),
            Scripted::Fail("reset"),
        ]);
        let svc = service(transport.clone());
        let mut state = initial_state();
        let mut seen = Vec::new();

        let started = Instant::now();
        let err = TaskToggle::new(&svc)
            .set_completed("a1", &mut state, "t1", true, |tasks| {
                seen.push(tasks[0].completed)
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), NETWORK_FAILURE_MESSAGE);
        assert_eq!(seen, vec![true, false]);
        assert!(!state.tasks()[0].completed);
        assert!(!state.is_in_flight("t1"));
        assert_eq!(transport.requests().len(), 3);
        // 1s after the first failure, 2s after the second, none after the last.
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn global_retry_budget_does_not_multiply_attempts() {
        let transport = ScriptedTransport::new(Vec::new());
        let svc = AppointmentService::new(
            AppointmentClient::new(BASE_URL),
            Fetcher::new(transport.clone()).retries(2),
        );
        let mut state = initial_state();

        let started = Instant::now();
        let err = TaskToggle::new(&svc)
            .set_completed("a1", &mut state, "t1", true, |_| {})
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), NETWORK_FAILURE_MESSAGE);
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
        assert!(!state.tasks()[0].completed);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_a_later_attempt() {
        let transport = ScriptedTransport::new(vec![
            Scripted::json(500, r#"{"message":"busy"}"#),
            Scripted::json(200, T1_DONE),
        ]);
        let svc = service(transport.clone());
        let mut state = initial_state();

        TaskToggle::new(&svc)
            .set_completed("a1", &mut state, "t1", true, |_| {})
            .await
            .unwrap();
        assert!(state.tasks()[0].completed);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn identity_mismatch_counts_as_failure() {
        let wrong = r#"{"_id":"a1","description":"Dentist","completed":true}"#;
        let transport = ScriptedTransport::new(vec![
            Scripted::json(200, wrong),
            Scripted::json(200, wrong),
            Scripted::json(200, wrong),
        ]);
        let svc = service(transport);
        let mut state = initial_state();

        let err = TaskToggle::new(&svc)
            .set_completed("a1", &mut state, "t1", true, |_| {})
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
        assert!(matches!(
            err,
            ToggleError::Failed {
                source: ApiError::InvalidResponse(_),
                ..
            }
        ));
        assert!(!state.tasks()[0].completed);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_task_is_rejected_without_a_request() {
        let transport = ScriptedTransport::new(Vec::new());
        let svc = service(transport.clone());
        let mut state = initial_state();

        let err = TaskToggle::new(&svc)
            .set_completed("a1", &mut state, "t9", true, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ToggleError::Rejected(TaskUpdateError::UnknownTask(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_then_refresh_reloads_the_list() {
        let refreshed = APPOINTMENT.replace(
            r#""_id":"t1","description":"Bring card","completed":false"#,
            r#""_id":"t1","description":"Bring card","completed":true"#,
        );
        let transport = ScriptedTransport::new(vec![
            Scripted::json(200, T1_DONE),
            Scripted::Respond(200, refreshed),
        ]);
        let svc = service(transport.clone());
        let mut state = initial_state();
        let mut seen = Vec::new();

        TaskToggle::new(&svc)
            .mode(TaskUpdateMode::ConfirmThenRefresh)
            .set_completed("a1", &mut state, "t1", true, |tasks| {
                seen.push(tasks[0].completed)
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![true]);
        assert!(state.tasks()[0].completed);
        let seen_requests = transport.requests();
        assert_eq!(seen_requests.len(), 2);
        assert_eq!(seen_requests[1].method, scheduler_core::HttpMethod::Get);
    }
}

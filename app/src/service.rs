//! Async appointment API: one method per REST operation.
//!
//! Each method pairs a core `build_*` with its `parse_*` and runs the pair
//! through the [`Fetcher`].

use std::sync::Arc;

use scheduler_core::{
    Ack, ApiError, Appointment, AppointmentClient, AppointmentPatch, AppointmentQuery, DateRange,
    GroupedAppointments, NewTask, RecurrenceRule, Task, TaskPatch,
};

use crate::config::AppConfig;
use crate::fetch::Fetcher;
use crate::transport::ReqwestTransport;

#[derive(Clone)]
pub struct AppointmentService {
    client: AppointmentClient,
    fetcher: Fetcher,
}

impl AppointmentService {
    pub fn new(client: AppointmentClient, fetcher: Fetcher) -> Self {
        Self { client, fetcher }
    }

    /// Service over reqwest, configured from the resolved CLI settings.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let client = config.headers.iter().fold(
            AppointmentClient::new(&config.api_url).with_update_method(config.update_method),
            |client, (name, value)| client.with_header(name, value),
        );
        let fetcher = Fetcher::new(Arc::new(ReqwestTransport::new()?))
            .timeout(config.timeout)
            .retries(config.retries);
        Ok(Self::new(client, fetcher))
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub async fn create_appointment(&self, input: &Appointment) -> Result<Appointment, ApiError> {
        let request = self.client.build_create_appointment(input)?;
        self.fetcher
            .fetch(request, |r| self.client.parse_create_appointment(r))
            .await
    }

    pub async fn list_appointments(
        &self,
        query: &AppointmentQuery,
    ) -> Result<Vec<Appointment>, ApiError> {
        let request = self.client.build_list_appointments(query);
        self.fetcher
            .fetch(request, |r| self.client.parse_list_appointments(r))
            .await
    }

    pub async fn get_appointment(&self, id: &str) -> Result<Appointment, ApiError> {
        let request = self.client.build_get_appointment(id);
        self.fetcher
            .fetch(request, |r| self.client.parse_get_appointment(r))
            .await
    }

    pub async fn update_appointment(
        &self,
        id: &str,
        input: &AppointmentPatch,
    ) -> Result<Appointment, ApiError> {
        let request = self.client.build_update_appointment(id, input)?;
        self.fetcher
            .fetch(request, |r| self.client.parse_update_appointment(r))
            .await
    }

    pub async fn delete_appointment(&self, id: &str, all_recurring: bool) -> Result<Ack, ApiError> {
        let request = self.client.build_delete_appointment(id, all_recurring);
        self.fetcher
            .fetch(request, |r| self.client.parse_delete_appointment(r))
            .await
    }

    pub async fn grouped_by_title(
        &self,
        range: Option<&DateRange>,
    ) -> Result<Vec<GroupedAppointments>, ApiError> {
        let request = self.client.build_grouped_by_title(range);
        self.fetcher
            .fetch(request, |r| self.client.parse_grouped_by_title(r))
            .await
    }

    pub async fn apply_recurrence(
        &self,
        id: &str,
        rule: &RecurrenceRule,
    ) -> Result<Appointment, ApiError> {
        let request = self.client.build_apply_recurrence(id, rule)?;
        self.fetcher
            .fetch(request, |r| self.client.parse_apply_recurrence(r))
            .await
    }

    pub async fn add_task(&self, appointment_id: &str, input: &NewTask) -> Result<Task, ApiError> {
        let request = self.client.build_add_task(appointment_id, input)?;
        self.fetcher
            .fetch(request, |r| self.client.parse_add_task(r))
            .await
    }

    /// Single attempt regardless of the configured retry budget; the task
    /// toggle applies its own backoff around this call.
    pub async fn update_task(
        &self,
        appointment_id: &str,
        task_id: &str,
        input: &TaskPatch,
    ) -> Result<Task, ApiError> {
        let request = self.client.build_update_task(appointment_id, task_id, input)?;
        self.fetcher
            .clone()
            .retries(0)
            .fetch(request, |r| self.client.parse_update_task(r))
            .await
    }

    pub async fn delete_task(&self, appointment_id: &str, task_id: &str) -> Result<Ack, ApiError> {
        let request = self.client.build_delete_task(appointment_id, task_id);
        self.fetcher
            .fetch(request, |r| self.client.parse_delete_task(r))
            .await
    }

    pub async fn get_task(&self, appointment_id: &str, task_id: &str) -> Result<Task, ApiError> {
        let request = self.client.build_get_task(appointment_id, task_id);
        self.fetcher
            .fetch(request, |r| self.client.parse_get_task(r))
            .await
    }

    /// `HEAD /`. Resolves to the status of whatever answered.
    pub async fn probe(&self) -> Result<u16, ApiError> {
        let request = self.client.build_probe();
        self.fetcher
            .fetch(request, |r| self.client.parse_probe(r))
            .await
    }
}

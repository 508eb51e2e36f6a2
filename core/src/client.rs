//! Stateless HTTP request builder and response parser for the appointment API.
//!
//! # Design
//! `AppointmentClient` holds a base URL, the verb used for appointment
//! updates and any caller headers. Each REST operation is split into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The host executes the actual HTTP round-trip (and owns timeouts and
//! retries), keeping this crate deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::{encode_component, AppointmentQuery, DateRange};
use crate::recurrence::RecurrenceRule;
use crate::types::{
    Ack, Appointment, AppointmentPatch, GroupedAppointments, NewTask, RecurrenceRequest, Task,
    TaskPatch,
};

const APPOINTMENTS_ENDPOINT: &str = "/appointments";

/// Verb used for `update appointment`. Backends have shipped both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMethod {
    #[default]
    Put,
    Patch,
}

impl From<UpdateMethod> for HttpMethod {
    fn from(m: UpdateMethod) -> Self {
        match m {
            UpdateMethod::Put => HttpMethod::Put,
            UpdateMethod::Patch => HttpMethod::Patch,
        }
    }
}

/// Stateless client for the appointment API.
#[derive(Debug, Clone)]
pub struct AppointmentClient {
    base_url: String,
    update_method: UpdateMethod,
    headers: Vec<(String, String)>,
}

impl AppointmentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            update_method: UpdateMethod::default(),
            headers: Vec::new(),
        }
    }

    /// Send `name: value` on every request, replacing a default header of the
    /// same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_update_method(mut self, method: UpdateMethod) -> Self {
        self.update_method = method;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `endpoint`, with leading/trailing slashes normalized.
    pub fn url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_start_matches('/').trim_end_matches('/');
        format!("{}/{endpoint}", self.base_url)
    }

    /// Base request shared by every operation: absolute URL, the JSON
    /// content-type header and the caller headers merged over it.
    pub fn request(&self, method: HttpMethod, endpoint: &str) -> HttpRequest {
        let request = HttpRequest {
            method,
            path: self.url(endpoint),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: None,
        };
        self.headers
            .iter()
            .fold(request, |req, (name, value)| req.with_header(name, value))
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, endpoint);
        req.body = Some(body);
        Ok(req)
    }

    // -----------------------------------------------------------------------
    // Appointments
    // -----------------------------------------------------------------------

    pub fn build_create_appointment(&self, input: &Appointment) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, APPOINTMENTS_ENDPOINT, input)
    }

    pub fn build_list_appointments(&self, query: &AppointmentQuery) -> HttpRequest {
        self.request(HttpMethod::Get, &with_query(APPOINTMENTS_ENDPOINT, &query.to_query_string()))
    }

    pub fn build_get_appointment(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &appointment_path(id))
    }

    pub fn build_update_appointment(
        &self,
        id: &str,
        input: &AppointmentPatch,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(self.update_method.into(), &appointment_path(id), input)
    }

    /// `all_recurring` asks the backend to cascade the delete to the whole
    /// series the appointment belongs to.
    pub fn build_delete_appointment(&self, id: &str, all_recurring: bool) -> HttpRequest {
        let path = appointment_path(id);
        let endpoint = if all_recurring {
            with_query(&path, "allRecurring=true")
        } else {
            path
        };
        self.request(HttpMethod::Delete, &endpoint)
    }

    pub fn build_grouped_by_title(&self, range: Option<&DateRange>) -> HttpRequest {
        let query = range.map(DateRange::to_query_string).unwrap_or_default();
        self.request(
            HttpMethod::Get,
            &with_query(&format!("{APPOINTMENTS_ENDPOINT}/grouped-by-title"), &query),
        )
    }

    pub fn build_apply_recurrence(
        &self,
        id: &str,
        rule: &RecurrenceRule,
    ) -> Result<HttpRequest, ApiError> {
        let body = RecurrenceRequest {
            rule: rule.to_string(),
        };
        self.json_request(
            HttpMethod::Post,
            &format!("{}/recurrence", appointment_path(id)),
            &body,
        )
    }

    /// Lightweight reachability probe against the API root.
    pub fn build_probe(&self) -> HttpRequest {
        self.request(HttpMethod::Head, "/")
    }

    pub fn parse_create_appointment(&self, response: HttpResponse) -> Result<Appointment, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_appointments(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Appointment>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_appointment(&self, response: HttpResponse) -> Result<Appointment, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_appointment(&self, response: HttpResponse) -> Result<Appointment, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete_appointment(&self, response: HttpResponse) -> Result<Ack, ApiError> {
        parse_ack(response)
    }

    pub fn parse_grouped_by_title(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<GroupedAppointments>, ApiError> {
        parse_json(response)
    }

    pub fn parse_apply_recurrence(&self, response: HttpResponse) -> Result<Appointment, ApiError> {
        parse_json(response)
    }

    /// Any HTTP answer counts as reachable; only transport failures do not.
    pub fn parse_probe(&self, response: HttpResponse) -> Result<u16, ApiError> {
        Ok(response.status)
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn build_add_task(&self, appointment_id: &str, input: &NewTask) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            &format!("{}/tasks", appointment_path(appointment_id)),
            input,
        )
    }

    pub fn build_update_task(
        &self,
        appointment_id: &str,
        task_id: &str,
        input: &TaskPatch,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, &task_path(appointment_id, task_id), input)
    }

    pub fn build_delete_task(&self, appointment_id: &str, task_id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &task_path(appointment_id, task_id))
    }

    pub fn build_get_task(&self, appointment_id: &str, task_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &task_path(appointment_id, task_id))
    }

    pub fn parse_add_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<Ack, ApiError> {
        parse_ack(response)
    }

    pub fn parse_get_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_json(response)
    }
}

/// Reject a task-update response that does not describe the task we asked to
/// change. A 2xx carrying another entity (no id, a different task, or the
/// parent appointment itself) is treated as a failed update.
pub fn verify_task_identity(
    appointment_id: &str,
    requested_task_id: &str,
    task: &Task,
) -> Result<(), ApiError> {
    let returned = task
        .id
        .as_deref()
        .ok_or_else(|| ApiError::InvalidResponse("task response has no _id".to_string()))?;
    if returned == appointment_id {
        return Err(ApiError::InvalidResponse(format!(
            "task response carries the appointment id {appointment_id}"
        )));
    }
    if returned != requested_task_id {
        return Err(ApiError::InvalidResponse(format!(
            "requested task {requested_task_id} but server returned {returned}"
        )));
    }
    Ok(())
}

fn appointment_path(id: &str) -> String {
    format!("{APPOINTMENTS_ENDPOINT}/{}", encode_component(id))
}

fn task_path(appointment_id: &str, task_id: &str) -> String {
    format!(
        "{}/tasks/{}",
        appointment_path(appointment_id),
        encode_component(task_id)
    )
}

fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Delete endpoints answer `{ "message": ... }`, but an empty success body
/// (204) is accepted as well.
fn parse_ack(response: HttpResponse) -> Result<Ack, ApiError> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Ok(Ack::default());
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map a non-2xx response to `ApiError::Http`. A JSON body supplies its
/// `message` field; a body that is not JSON falls back to the status's reason
/// phrase. Anything else gets `HTTP error! status: N`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let body = serde_json::from_str::<serde_json::Value>(&response.body).ok();
    let message = match &body {
        Some(json) => json
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string),
        None => http::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string),
    }
    .unwrap_or_else(|| format!("HTTP error! status: {}", response.status));
    tracing::debug!(status = response.status, %message, "API returned error status");
    Err(ApiError::Http {
        status: response.status,
        message,
        body,
    })
}

//! In-memory stand-in for the appointment backend.
//!
//! Implements the REST surface the client consumes (appointments, nested
//! tasks, grouped-by-title aggregation, recurrence) over a `RwLock`ed map.
//! Error responses carry `{ "message": ... }` bodies like the real API.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointment {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_rule: Option<String>,
    #[serde(default)]
    pub tasks: Vec<CreateTask>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointment {
    pub title: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub is_recurring: Option<bool>,
    pub recurrence_rule: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTask {
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTask {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct RecurrenceBody {
    pub rule: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub recurrence_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    #[serde(default)]
    pub all_recurring: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalDuration {
    pub hours: i64,
    pub minutes: i64,
    pub total_minutes: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub title: String,
    pub appointments: Vec<Appointment>,
    pub total_duration: TotalDuration,
}

pub type Db = Arc<RwLock<HashMap<String, Appointment>>>;

type ApiResult<T> = Result<T, (StatusCode, Json<serde_json::Value>)>;

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({ "message": message })))
}

fn not_found(what: &str) -> (StatusCode, Json<serde_json::Value>) {
    error(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/", get(root))
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route("/appointments/grouped-by-title", get(grouped_by_title))
        .route(
            "/appointments/{id}",
            get(get_appointment)
                .put(update_appointment)
                .patch(update_appointment)
                .delete(delete_appointment),
        )
        .route("/appointments/{id}/tasks", post(add_task))
        .route(
            "/appointments/{id}/tasks/{task_id}",
            get(get_task)
                .put(update_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .route("/appointments/{id}/recurrence", post(apply_recurrence))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

async fn root() -> StatusCode {
    StatusCode::OK
}

async fn list_appointments(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Appointment>> {
    let appointments = db.read().await;
    let mut found: Vec<Appointment> = appointments
        .values()
        .filter(|a| match &params.recurrence_id {
            Some(series) => a.recurrence_id.as_deref() == Some(series.as_str()),
            None => true,
        })
        .filter(|a| in_window(a, params.start_date, params.end_date))
        .cloned()
        .collect();
    found.sort_by(|a, b| a.start.cmp(&b.start));
    Json(found)
}

async fn create_appointment(
    State(db): State<Db>,
    Json(input): Json<CreateAppointment>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    if input.start >= input.end {
        return Err(error(StatusCode::BAD_REQUEST, "End time must be after start time"));
    }
    let appointment = Appointment {
        id: new_id(),
        title: input.title,
        start: input.start,
        end: input.end,
        is_recurring: input.is_recurring,
        recurrence_rule: input.recurrence_rule,
        recurrence_id: None,
        original_start: None,
        tasks: input
            .tasks
            .into_iter()
            .map(|t| Task {
                id: new_id(),
                description: t.description,
                completed: t.completed,
            })
            .collect(),
    };
    db.write()
        .await
        .insert(appointment.id.clone(), appointment.clone());
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn get_appointment(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    let appointments = db.read().await;
    appointments
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Appointment"))
}

async fn update_appointment(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<UpdateAppointment>,
) -> ApiResult<Json<Appointment>> {
    let mut appointments = db.write().await;
    let appointment = appointments
        .get_mut(&id)
        .ok_or_else(|| not_found("Appointment"))?;
    let start = input.start.unwrap_or(appointment.start);
    let end = input.end.unwrap_or(appointment.end);
    if start >= end {
        return Err(error(StatusCode::BAD_REQUEST, "End time must be after start time"));
    }
    if appointment.recurrence_id.is_some() && start != appointment.start {
        appointment.original_start.get_or_insert(appointment.start);
    }
    appointment.start = start;
    appointment.end = end;
    if let Some(title) = input.title {
        appointment.title = title;
    }
    if let Some(is_recurring) = input.is_recurring {
        appointment.is_recurring = is_recurring;
    }
    if let Some(rule) = input.recurrence_rule {
        appointment.recurrence_rule = Some(rule);
    }
    Ok(Json(appointment.clone()))
}

async fn delete_appointment(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut appointments = db.write().await;
    let target = appointments
        .get(&id)
        .cloned()
        .ok_or_else(|| not_found("Appointment"))?;
    if params.all_recurring {
        let series = target.recurrence_id.unwrap_or_else(|| target.id.clone());
        appointments.retain(|key, a| {
            key != &id && key != &series && a.recurrence_id.as_deref() != Some(series.as_str())
        });
        return Ok(Json(json!({ "message": "Recurring series deleted" })));
    }
    appointments.remove(&id);
    Ok(Json(json!({ "message": "Appointment deleted" })))
}

async fn add_task(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<CreateTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    if input.description.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "Task description is required"));
    }
    let mut appointments = db.write().await;
    let appointment = appointments
        .get_mut(&id)
        .ok_or_else(|| not_found("Appointment"))?;
    let task = Task {
        id: new_id(),
        description: input.description,
        completed: input.completed,
    };
    appointment.tasks.push(task.clone());
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(db): State<Db>,
    Path((id, task_id)): Path<(String, String)>,
) -> ApiResult<Json<Task>> {
    let appointments = db.read().await;
    let appointment = appointments
        .get(&id)
        .ok_or_else(|| not_found("Appointment"))?;
    appointment
        .tasks
        .iter()
        .find(|t| t.id == task_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("Task"))
}

async fn update_task(
    State(db): State<Db>,
    Path((id, task_id)): Path<(String, String)>,
    Json(input): Json<UpdateTask>,
) -> ApiResult<Json<Task>> {
    let mut appointments = db.write().await;
    let appointment = appointments
        .get_mut(&id)
        .ok_or_else(|| not_found("Appointment"))?;
    let task = appointment
        .tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or_else(|| not_found("Task"))?;
    if let Some(description) = input.description {
        task.description = description;
    }
    if let Some(completed) = input.completed {
        task.completed = completed;
    }
    Ok(Json(task.clone()))
}

async fn delete_task(
    State(db): State<Db>,
    Path((id, task_id)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut appointments = db.write().await;
    let appointment = appointments
        .get_mut(&id)
        .ok_or_else(|| not_found("Appointment"))?;
    let before = appointment.tasks.len();
    appointment.tasks.retain(|t| t.id != task_id);
    if appointment.tasks.len() == before {
        return Err(not_found("Task"));
    }
    Ok(Json(json!({ "message": "Task deleted" })))
}

async fn grouped_by_title(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Group>> {
    let appointments = db.read().await;
    let mut groups: Vec<Group> = Vec::new();
    let mut selected: Vec<&Appointment> = appointments
        .values()
        .filter(|a| in_window(a, params.start_date, params.end_date))
        .collect();
    selected.sort_by(|a, b| a.start.cmp(&b.start));
    for appointment in selected {
        let minutes = (appointment.end - appointment.start).num_minutes();
        let index = match groups.iter().position(|g| g.title == appointment.title) {
            Some(i) => i,
            None => {
                groups.push(Group {
                    title: appointment.title.clone(),
                    appointments: Vec::new(),
                    total_duration: TotalDuration {
                        hours: 0,
                        minutes: 0,
                        total_minutes: 0,
                    },
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        group.appointments.push(appointment.clone());
        let total = group.total_duration.total_minutes + minutes;
        group.total_duration = TotalDuration {
            hours: total / 60,
            minutes: total % 60,
            total_minutes: total,
        };
    }
    Json(groups)
}

/// Turn the appointment into the head of a series and add `COUNT - 1`
/// follow-up instances spaced by `FREQ`.
async fn apply_recurrence(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(body): Json<RecurrenceBody>,
) -> ApiResult<Json<Appointment>> {
    let (step, count) = parse_rule(&body.rule)
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "Invalid recurrence rule"))?;
    let mut appointments = db.write().await;
    let parent = appointments
        .get_mut(&id)
        .ok_or_else(|| not_found("Appointment"))?;
    parent.is_recurring = true;
    parent.recurrence_rule = Some(body.rule.clone());
    parent.recurrence_id = Some(id.clone());
    let parent = parent.clone();

    for n in 1..count {
        let (Some(start), Some(end)) = (step.shift(parent.start, n), step.shift(parent.end, n))
        else {
            break;
        };
        let instance = Appointment {
            id: new_id(),
            start,
            end,
            tasks: Vec::new(),
            ..parent.clone()
        };
        appointments.insert(instance.id.clone(), instance);
    }
    Ok(Json(parent))
}

#[derive(Clone, Copy)]
enum Step {
    Days(u64),
    Months(u32),
}

impl Step {
    fn shift(self, t: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
        match self {
            Step::Days(d) => t.checked_add_days(Days::new(d * u64::from(n))),
            Step::Months(m) => t.checked_add_months(Months::new(m * n)),
        }
    }
}

fn parse_rule(rule: &str) -> Option<(Step, u32)> {
    let mut step = None;
    let mut count = None;
    for part in rule.split(';').filter(|p| !p.is_empty()) {
        let (key, value) = part.split_once('=')?;
        match key {
            "FREQ" => {
                step = Some(match value {
                    "DAILY" => Step::Days(1),
                    "WEEKLY" => Step::Days(7),
                    "MONTHLY" => Step::Months(1),
                    "YEARLY" => Step::Months(12),
                    _ => return None,
                })
            }
            "COUNT" => count = value.parse::<u32>().ok().filter(|c| *c > 0),
            _ => return None,
        }
    }
    Some((step?, count?))
}

fn in_window(a: &Appointment, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    let day = a.start.date_naive();
    start.map_or(true, |s| day >= s) && end.map_or(true, |e| day < e)
}

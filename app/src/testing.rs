//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scheduler_core::{ApiError, AppointmentClient, HttpRequest, HttpResponse};

use crate::fetch::Fetcher;
use crate::service::AppointmentService;
use crate::transport::Transport;

pub const BASE_URL: &str = "http://scheduler.test";

#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(u16, String),
    Fail(&'static str),
    /// Never answers; only a timeout ends the request.
    Hang,
}

impl Scripted {
    pub fn json(status: u16, body: &str) -> Self {
        Scripted::Respond(status, body.to_string())
    }
}

/// Answers requests from a queue, recording every request it sees. An
/// exhausted queue behaves like a refused connection.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.seen.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Respond(status, body)) => Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body,
            }),
            Some(Scripted::Fail(reason)) => Err(ApiError::Network(reason.to_string())),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(ApiError::Network("script exhausted".to_string())),
        }
    }
}

pub fn service(transport: Arc<ScriptedTransport>) -> AppointmentService {
    AppointmentService::new(AppointmentClient::new(BASE_URL), Fetcher::new(transport))
}

pub const APPOINTMENT: &str = r#"{"_id":"a1","title":"Dentist","start":"2024-05-06T09:00:00.000Z","end":"2024-05-06T10:00:00.000Z","isRecurring":false,"tasks":[{"_id":"t1","description":"Bring card","completed":false},{"_id":"t2","description":"Pay","completed":true}]}"#;

//! Request execution with a timeout and an optional fixed-delay retry budget.
//!
//! The parse step runs inside the retry loop, so a non-2xx status or a body
//! that fails to parse consumes a retry just like a network error does.

use std::sync::Arc;
use std::time::Duration;

use scheduler_core::{ApiError, HttpRequest, HttpResponse};
use tracing::{debug, warn};

use crate::transport::Transport;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);
pub const RETRY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra attempts after the first one fails.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Execute `request` and hand the response to `parse`, retrying the whole
    /// exchange while the budget lasts.
    pub async fn fetch<T, F>(&self, request: HttpRequest, parse: F) -> Result<T, ApiError>
    where
        F: Fn(HttpResponse) -> Result<T, ApiError>,
    {
        let mut remaining = self.retries;
        loop {
            match self.attempt(request.clone(), &parse).await {
                Ok(value) => return Ok(value),
                Err(err) if remaining > 0 => {
                    remaining -= 1;
                    warn!(
                        method = %request.method,
                        url = %request.path,
                        error = %err,
                        remaining,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn attempt<T, F>(&self, request: HttpRequest, parse: &F) -> Result<T, ApiError>
    where
        F: Fn(HttpResponse) -> Result<T, ApiError>,
    {
        let method = request.method;
        let url = request.path.clone();
        debug!(%method, %url, "sending HTTP request");

        let response = tokio::time::timeout(self.timeout, self.transport.execute(request))
            .await
            .map_err(|_| ApiError::TimedOut {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })??;

        debug!(%method, %url, status = response.status, "received HTTP response");
        parse(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Scripted, ScriptedTransport};
    use scheduler_core::HttpMethod;
    use tokio::time::Instant;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: "http://localhost:3000/appointments".into(),
            headers: Vec::new(),
            body: None,
        }
    }

    fn status(response: HttpResponse) -> Result<u16, ApiError> {
        if response.is_success() {
            Ok(response.status)
        } else {
            Err(ApiError::Http {
                status: response.status,
                message: "failed".into(),
                body: None,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_configured_duration() {
        let transport = ScriptedTransport::new(vec![Scripted::Hang]);
        let fetcher = Fetcher::new(transport.clone()).timeout(Duration::from_millis(8000));

        let started = Instant::now();
        let err = fetcher.fetch(request(), status).await.unwrap_err();
        assert!(matches!(err, ApiError::TimedOut { timeout_ms: 8000 }));
        assert_eq!(err.to_string(), "Request timed out after 8000ms");
        assert_eq!(started.elapsed(), Duration::from_millis(8000));
    }

    #[tokio::test(start_paused = true)]
    async fn no_retries_by_default() {
        let transport = ScriptedTransport::new(vec![
            Scripted::Fail("connection refused"),
            Scripted::json(200, "{}"),
        ]);
        let fetcher = Fetcher::new(transport.clone());
        let err = fetcher.fetch(request(), status).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_fixed_delay_on_any_failure() {
        let transport = ScriptedTransport::new(vec![
            Scripted::Fail("connection refused"),
            Scripted::json(500, r#"{"message":"boom"}"#),
            Scripted::json(200, "{}"),
        ]);
        let fetcher = Fetcher::new(transport.clone()).retries(2);

        let started = Instant::now();
        assert_eq!(fetcher.fetch(request(), status).await.unwrap(), 200);
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_when_budget_is_spent() {
        let transport = ScriptedTransport::new(vec![
            Scripted::json(503, ""),
            Scripted::json(503, ""),
        ]);
        let fetcher = Fetcher::new(transport.clone()).retries(1);
        let err = fetcher.fetch(request(), status).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(transport.requests().len(), 2);
    }
}

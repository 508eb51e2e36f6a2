//! Backend reachability.

use std::time::Duration;

use tracing::{debug, info};

use crate::service::AppointmentService;

pub const PROBE_INTERVAL: Duration = Duration::from_secs(3);

/// Connected means the server answered at all, whatever the status.
pub async fn check_connection(service: &AppointmentService) -> bool {
    match service.probe().await {
        Ok(status) => {
            debug!(status, url = service.base_url(), "backend answered probe");
            true
        }
        Err(err) => {
            debug!(error = %err, url = service.base_url(), "backend probe failed");
            false
        }
    }
}

/// Probe up to `max_probes` times, `PROBE_INTERVAL` apart.
pub async fn wait_for_backend(service: &AppointmentService, max_probes: u32) -> bool {
    for probe in 1..=max_probes.max(1) {
        if check_connection(service).await {
            return true;
        }
        if probe < max_probes {
            info!(probe, max_probes, interval = ?PROBE_INTERVAL, "backend unavailable, probing again");
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }
    false
}

use chrono::{DateTime, TimeZone, Utc};
use scheduler_core::{Agenda, Appointment, AppointmentQuery, RecurrenceRule};
use tracing::{debug, info};

use super::appointment_id;
use crate::error::{AppError, Result};
use crate::service::AppointmentService;
use crate::views::{self, DisplayMode, Theme};

pub const NO_INSTANCES: &str = "No recurring instances found.";

/// A series head and every appointment sharing its series id.
#[derive(Debug, Clone)]
pub struct RecurrencePage {
    parent: Appointment,
    instances: Agenda,
}

impl RecurrencePage {
    /// Load the series `id` belongs to. `id` may name the head or any
    /// instance.
    pub async fn load(service: &AppointmentService, id: &str) -> Result<Self> {
        let appointment = service.get_appointment(id).await?;
        let series_id = appointment
            .series_id()
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string());
        let parent = if series_id == id {
            appointment
        } else {
            service.get_appointment(&series_id).await?
        };
        let instances = service
            .list_appointments(&AppointmentQuery::series(series_id))
            .await?;
        Ok(Self {
            parent,
            instances: Agenda::new(instances),
        })
    }

    /// Expand appointment `id` into a series and load it.
    pub async fn apply(service: &AppointmentService, id: &str, rule: &RecurrenceRule) -> Result<Self> {
        let head = service.apply_recurrence(id, rule).await?;
        info!(id, %rule, "recurrence applied");
        Self::load(service, head.id.as_deref().unwrap_or(id)).await
    }

    pub fn parent(&self) -> &Appointment {
        &self.parent
    }

    pub fn instances(&self) -> &[Appointment] {
        self.instances.as_slice()
    }

    /// Delete one instance and drop it from the series listing. The head
    /// stays; deleting it goes through the whole-series path.
    pub async fn remove_instance(
        &mut self,
        service: &AppointmentService,
        instance_id: &str,
    ) -> Result<Appointment> {
        let series_id = appointment_id(&self.parent)?;
        let instance = match self.instances.get(instance_id) {
            Some(instance) if instance_id != series_id => instance,
            _ => {
                return Err(AppError::NotInSeries {
                    series_id,
                    id: instance_id.to_string(),
                })
            }
        };
        debug!(series_id = %series_id, instance_id, title = %instance.title, "removing instance");
        service.delete_appointment(instance_id, false).await?;
        self.instances
            .remove(instance_id)
            .ok_or_else(|| AppError::NotInSeries {
                series_id,
                id: instance_id.to_string(),
            })
    }

    /// Delete the whole series. Returns how many listed appointments went
    /// with it.
    pub async fn delete_series(mut self, service: &AppointmentService) -> Result<usize> {
        let id = appointment_id(&self.parent)?;
        service.delete_appointment(&id, true).await?;
        Ok(self.instances.remove_series(&id))
    }

    pub fn render<Tz: TimeZone>(&self, tz: &Tz, now: DateTime<Utc>, theme: &Theme) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut out = theme.heading("Recurring Appointment Series");
        out.push_str("\n\n");
        out.push_str(&theme.strong("Main Appointment"));
        out.push('\n');
        out.push_str(&views::render_appointment_list(&[&self.parent], tz, now, DisplayMode::Full, theme));
        out.push_str("\n\n");
        out.push_str(&theme.strong("Recurring Instances"));
        out.push('\n');
        if self.instances.is_empty() {
            out.push_str(&theme.muted(NO_INSTANCES));
        } else {
            let mut instances: Vec<&Appointment> = self.instances.as_slice().iter().collect();
            instances.sort_by_key(|a| a.start);
            out.push_str(&views::render_appointment_list(
                &instances,
                tz,
                now,
                DisplayMode::Compact,
                theme,
            ));
        }
        out
    }
}

/// Preset rules, the default one starred.
pub fn render_presets(theme: &Theme) -> String {
    RecurrenceRule::PRESETS
        .iter()
        .map(|rule| {
            let marker = if *rule == RecurrenceRule::default() { "*" } else { " " };
            format!("{marker} {}  {}", rule.label(), theme.muted(&rule.to_string()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

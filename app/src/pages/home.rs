use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use scheduler_core::{
    date_filters, Agenda, Appointment, AppointmentDraft, AppointmentQuery, DateFilterKey,
    DateFilters, DateRange, GroupedAppointments, Task, TaskDraft,
};
use tracing::debug;

use crate::error::Result;
use crate::service::AppointmentService;
use crate::views::{self, DisplayMode, Theme};

/// Appointment list plus the time-per-title chart for one date window.
#[derive(Debug, Clone)]
pub struct HomePage {
    agenda: Agenda,
    filters: DateFilters,
    filter: DateFilterKey,
    groups: Vec<GroupedAppointments>,
}

impl HomePage {
    /// A page for `filter` relative to `today` with nothing loaded yet.
    pub fn new(filter: DateFilterKey, today: NaiveDate) -> Self {
        Self {
            agenda: Agenda::default(),
            filters: date_filters(today),
            filter,
            groups: Vec::new(),
        }
    }

    /// Fetch the list and the grouped totals concurrently.
    pub async fn load(
        service: &AppointmentService,
        filter: DateFilterKey,
        today: NaiveDate,
    ) -> Result<Self> {
        let mut page = Self::new(filter, today);
        let query = AppointmentQuery::default();
        let range = page.range();
        let (appointments, groups) = tokio::try_join!(
            service.list_appointments(&query),
            service.grouped_by_title(Some(&range)),
        )?;
        debug!(appointments = appointments.len(), groups = groups.len(), %filter, "home page loaded");
        page.agenda = Agenda::new(appointments);
        page.groups = groups;
        Ok(page)
    }

    /// Fetch only the appointment list.
    pub async fn load_list(
        service: &AppointmentService,
        filter: DateFilterKey,
        today: NaiveDate,
    ) -> Result<Self> {
        let mut page = Self::new(filter, today);
        let appointments = service.list_appointments(&AppointmentQuery::default()).await?;
        debug!(appointments = appointments.len(), %filter, "appointment list loaded");
        page.agenda = Agenda::new(appointments);
        Ok(page)
    }

    /// Fetch only the grouped totals for the selected window.
    pub async fn load_chart(
        service: &AppointmentService,
        filter: DateFilterKey,
        today: NaiveDate,
    ) -> Result<Self> {
        let mut page = Self::new(filter, today);
        let range = page.range();
        page.groups = service.grouped_by_title(Some(&range)).await?;
        debug!(groups = page.groups.len(), %filter, "chart data loaded");
        Ok(page)
    }

    fn range(&self) -> DateRange {
        self.filters.get(self.filter).range()
    }

    pub fn agenda(&self) -> &Agenda {
        &self.agenda
    }

    pub fn groups(&self) -> &[GroupedAppointments] {
        &self.groups
    }

    /// Appointments starting inside the selected window, most recent first.
    pub fn visible<Tz: TimeZone>(&self, tz: &Tz) -> Vec<&Appointment> {
        self.agenda.filtered(self.filters.get(self.filter), tz)
    }

    /// Validate the form, create the appointment and list it.
    pub async fn create(
        &mut self,
        service: &AppointmentService,
        draft: AppointmentDraft,
    ) -> Result<Appointment> {
        let input = draft.into_appointment()?;
        let created = service.create_appointment(&input).await?;
        self.agenda.push(created.clone());
        Ok(created)
    }

    /// Add a task to a listed appointment. The task is appended to that
    /// appointment only.
    pub async fn add_task(
        &mut self,
        service: &AppointmentService,
        appointment_id: &str,
        draft: TaskDraft,
    ) -> Result<Task> {
        let input = draft.into_new_task()?;
        let task = service.add_task(appointment_id, &input).await?;
        if !self.agenda.append_task(appointment_id, task.clone()) {
            debug!(appointment_id, "task added to an appointment that is not listed");
        }
        Ok(task)
    }

    /// Swap in the server's current version of a listed appointment.
    pub async fn refresh(&mut self, service: &AppointmentService, id: &str) -> Result<Appointment> {
        let appointment = service.get_appointment(id).await?;
        if !self.agenda.replace(appointment.clone()) {
            self.agenda.push(appointment.clone());
        }
        Ok(appointment)
    }

    pub fn render_list<Tz: TimeZone>(
        &self,
        tz: &Tz,
        now: DateTime<Utc>,
        mode: DisplayMode,
        theme: &Theme,
    ) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let visible = self.visible(tz);
        format!(
            "{}\n{}\n\n{}",
            views::render_header(theme),
            views::render_filter_buttons(&self.filters, self.filter, theme),
            views::render_appointment_list(&visible, tz, now, mode, theme)
        )
    }

    pub fn render_chart(&self, max_items: usize, width: usize, theme: &Theme) -> String {
        format!(
            "{}\n\n{}",
            views::render_filter_buttons(&self.filters, self.filter, theme),
            views::render_chart(&self.groups, max_items, width, theme)
        )
    }
}

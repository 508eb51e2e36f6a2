//! Page state and handlers. A page owns its in-memory data and is the only
//! thing that mutates it; handlers call the service and fold the result in.

pub mod appointment;
pub mod home;
pub mod recurrence;

pub use appointment::AppointmentPage;
pub use home::HomePage;
pub use recurrence::RecurrencePage;

use scheduler_core::Appointment;

use crate::error::AppError;

fn appointment_id(appointment: &Appointment) -> Result<String, AppError> {
    appointment.id.clone().ok_or_else(|| AppError::MissingId {
        title: appointment.title.clone(),
    })
}

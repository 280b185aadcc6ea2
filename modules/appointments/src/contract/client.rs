use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::contract::{
    error::AppointmentsError,
    model::{Appointment, AppointmentPatch, NewAppointment, SlotTime},
};

/// Public API trait for the appointments module that other modules can use
#[async_trait]
pub trait AppointmentsApi: Send + Sync {
    /// Bookable slot starts for a day, ascending
    async fn available_slots(&self, date: NaiveDate) -> Result<Vec<SlotTime>, AppointmentsError>;

    /// Book a new appointment
    async fn book(&self, new: NewAppointment) -> Result<Appointment, AppointmentsError>;

    /// Get an appointment by ID
    async fn get_appointment(&self, id: Uuid) -> Result<Appointment, AppointmentsError>;

    /// List appointments, optionally restricted to one day
    async fn list_appointments(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, AppointmentsError>;

    /// Move an appointment to another date and/or time
    async fn reschedule(
        &self,
        id: Uuid,
        date: NaiveDate,
        start_time: SlotTime,
    ) -> Result<Appointment, AppointmentsError>;

    /// Apply a staff edit
    async fn update_appointment(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, AppointmentsError>;

    /// Cancel (delete) an appointment
    async fn cancel(&self, id: Uuid) -> Result<(), AppointmentsError>;
}

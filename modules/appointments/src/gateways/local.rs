use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::AppointmentsApi,
    error::AppointmentsError,
    model::{Appointment, AppointmentPatch, NewAppointment, SlotTime},
};
use crate::domain::service::Service;

/// Local implementation of the AppointmentsApi trait that delegates to the domain service
pub struct AppointmentsLocalClient {
    service: Arc<Service>,
}

impl AppointmentsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl AppointmentsApi for AppointmentsLocalClient {
    async fn available_slots(&self, date: NaiveDate) -> Result<Vec<SlotTime>, AppointmentsError> {
        self.service
            .list_available_slots(date)
            .await
            .map_err(Into::into)
    }

    async fn book(&self, new: NewAppointment) -> Result<Appointment, AppointmentsError> {
        self.service.try_book(new).await.map_err(Into::into)
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Appointment, AppointmentsError> {
        self.service.get_appointment(id).await.map_err(Into::into)
    }

    async fn list_appointments(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, AppointmentsError> {
        self.service.list_appointments(date).await.map_err(Into::into)
    }

    async fn reschedule(
        &self,
        id: Uuid,
        date: NaiveDate,
        start_time: SlotTime,
    ) -> Result<Appointment, AppointmentsError> {
        self.service
            .reschedule(id, date, start_time)
            .await
            .map_err(Into::into)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, AppointmentsError> {
        self.service
            .update_appointment(id, patch)
            .await
            .map_err(Into::into)
    }

    async fn cancel(&self, id: Uuid) -> Result<(), AppointmentsError> {
        self.service.cancel(id).await.map_err(Into::into)
    }
}

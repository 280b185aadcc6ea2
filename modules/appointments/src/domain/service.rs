use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{Appointment, AppointmentPatch, NewAppointment, SlotTime};
use crate::domain::catalog::{self, CatalogService, Quote, ServiceCatalog};
use crate::domain::error::DomainError;
use crate::domain::events::{SlotChange, SlotsDomainEvent};
use crate::domain::locks::DateLocks;
use crate::domain::ports::{Clock, EventPublisher};
use crate::domain::repo::{AppointmentRecord, AppointmentUpdate, AppointmentsRepository};
use crate::domain::slots::{free_slots, Interval, OperatingHours};

/// Longest single appointment the allocator accepts.
const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Slot allocator: availability queries and non-overlapping bookings.
/// Depends only on the repository, publisher and clock ports.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn AppointmentsRepository>,
    events: Arc<dyn EventPublisher<SlotsDomainEvent>>,
    clock: Arc<dyn Clock>,
    locks: Arc<DateLocks>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub hours: OperatingHours,
    pub require_aligned_start: bool,
    pub store_timeout: Duration,
    pub catalog: ServiceCatalog,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            hours: OperatingHours::default(),
            require_aligned_start: false,
            store_timeout: Duration::from_secs(5),
            catalog: ServiceCatalog::default(),
        }
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repo: Arc<dyn AppointmentsRepository>,
        events: Arc<dyn EventPublisher<SlotsDomainEvent>>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            events,
            clock,
            locks: Arc::new(DateLocks::new()),
            config,
        }
    }

    pub fn hours(&self) -> &OperatingHours {
        &self.config.hours
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    #[instrument(name = "appointments.service.list_available_slots", skip(self), fields(date = %date))]
    pub async fn list_available_slots(&self, date: NaiveDate) -> Result<Vec<SlotTime>, DomainError> {
        let booked = self.store("find_by_date", self.repo.find_by_date(date)).await?;
        let slots = free_slots(&self.config.hours, booked.iter().map(Appointment::interval));
        debug!(booked = booked.len(), free = slots.len(), "Computed available slots");
        Ok(slots)
    }

    #[instrument(
        name = "appointments.service.try_book",
        skip(self, new),
        fields(date = %new.date, start = %new.start_time)
    )]
    pub async fn try_book(&self, new: NewAppointment) -> Result<Appointment, DomainError> {
        info!("Booking appointment");

        let duration = self.validate_new_appointment(&new)?;
        self.validate_slot(new.date, new.start_time)?;
        let candidate = Interval::new(new.start_time, duration);

        let _guard = self.locks.lock(new.date).await;

        let existing = self
            .store("find_by_date", self.repo.find_by_date(new.date))
            .await?;
        check_conflict(new.date, &existing, candidate, None)?;

        let ticket_number = self
            .store("next_ticket_number", self.repo.next_ticket_number())
            .await?;
        let total_price = new
            .total_price
            .unwrap_or_else(|| catalog::totals(&new.services).price);

        let record = AppointmentRecord {
            date: new.date,
            start_time: new.start_time,
            duration_minutes: duration,
            services: new.services,
            total_price,
            ticket_number,
            customer: new.customer,
        };
        let appointment = self.store("insert", self.repo.insert(record)).await?;

        let available = free_slots(
            &self.config.hours,
            existing
                .iter()
                .map(Appointment::interval)
                .chain(std::iter::once(candidate)),
        );
        self.events.publish(&SlotsDomainEvent {
            date: appointment.date,
            available_slots: Some(available),
            cause: SlotChange::Booked,
            at: Utc::now(),
        });

        info!(
            id = %appointment.id,
            ticket = appointment.ticket_number,
            "Successfully booked appointment"
        );
        Ok(appointment)
    }

    /// The salon's service menu, ordered by id.
    pub fn list_services(&self) -> Vec<CatalogService> {
        self.config.catalog.list()
    }

    /// Price and duration of a selection of menu ids, summed the same way a
    /// booking is.
    #[instrument(name = "appointments.service.quote_services", skip(self))]
    pub fn quote_services(&self, ids: &[String]) -> Result<Quote, DomainError> {
        let quote = self.config.catalog.quote(ids)?;
        if !quote.unknown.is_empty() {
            debug!(unknown = ?quote.unknown, "Ignoring unknown services in quote");
        }
        Ok(quote)
    }

    #[instrument(name = "appointments.service.get_appointment", skip(self), fields(appointment_id = %id))]
    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, DomainError> {
        debug!("Getting appointment by id");
        self.store("find_by_id", self.repo.find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::not_found(id))
    }

    /// Appointments ordered by date, then start time.
    #[instrument(name = "appointments.service.list_appointments", skip(self))]
    pub async fn list_appointments(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, DomainError> {
        let mut items = match date {
            Some(date) => self.store("find_by_date", self.repo.find_by_date(date)).await?,
            None => self.store("list_all", self.repo.list_all()).await?,
        };
        items.sort_by_key(|a| (a.date, a.start_time, a.ticket_number));
        debug!("Listed {} appointments", items.len());
        Ok(items)
    }

    #[instrument(
        name = "appointments.service.reschedule",
        skip(self),
        fields(appointment_id = %id, date = %date, start = %start_time)
    )]
    pub async fn reschedule(
        &self,
        id: Uuid,
        date: NaiveDate,
        start_time: SlotTime,
    ) -> Result<Appointment, DomainError> {
        info!("Rescheduling appointment");
        self.move_appointment(id, date, start_time, None).await
    }

    /// Staff edit: rename and/or move. Moves go through the same conflict
    /// check as `reschedule`; a pure rename does not touch the calendar.
    #[instrument(name = "appointments.service.update_appointment", skip(self), fields(appointment_id = %id))]
    pub async fn update_appointment(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, DomainError> {
        info!("Updating appointment");

        if let Some(name) = &patch.customer_name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name", "cannot be empty"));
            }
        }

        if patch.moves() {
            let current = self.get_appointment(id).await?;
            // edit forms echo the current slot back; only a real change is a move
            if patch.changes_slot_of(&current) {
                let date = patch.date.unwrap_or(current.date);
                let start_time = patch.start_time.unwrap_or(current.start_time);
                return self
                    .move_appointment(id, date, start_time, patch.customer_name)
                    .await;
            }
        }

        let update = AppointmentUpdate {
            customer_name: patch.customer_name,
            ..Default::default()
        };
        let updated = self
            .store("update", self.repo.update(id, update))
            .await?
            .ok_or_else(|| DomainError::not_found(id))?;
        info!("Successfully updated appointment");
        Ok(updated)
    }

    #[instrument(name = "appointments.service.cancel", skip(self), fields(appointment_id = %id))]
    pub async fn cancel(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Cancelling appointment");

        let current = self.get_appointment(id).await?;
        let _guard = self.locks.lock(current.date).await;

        let removed = self
            .store("delete", self.repo.delete(id))
            .await?
            .ok_or_else(|| DomainError::not_found(id))?;

        self.publish_for(removed.date, SlotChange::Cancelled).await;
        info!(ticket = removed.ticket_number, "Successfully cancelled appointment");
        Ok(())
    }

    async fn move_appointment(
        &self,
        id: Uuid,
        date: NaiveDate,
        start_time: SlotTime,
        customer_name: Option<String>,
    ) -> Result<Appointment, DomainError> {
        let before = self.get_appointment(id).await?;
        self.validate_slot(date, start_time)?;

        let _guard = self.locks.lock_pair(before.date, date).await;

        // re-read under the lock: a concurrent cancel may have won
        let current = self.get_appointment(id).await?;
        let candidate = Interval::new(start_time, current.duration_minutes);
        let existing = self
            .store("find_by_date", self.repo.find_by_date(date))
            .await?;
        check_conflict(date, &existing, candidate, Some(id))?;

        let update = AppointmentUpdate {
            customer_name,
            date: Some(date),
            start_time: Some(start_time),
        };
        let updated = self
            .store("update", self.repo.update(id, update))
            .await?
            .ok_or_else(|| DomainError::not_found(id))?;

        if current.date != date {
            self.publish_for(current.date, SlotChange::Rescheduled).await;
        }
        self.publish_for(date, SlotChange::Rescheduled).await;

        info!(
            from_date = %current.date,
            from_start = %current.start_time,
            "Successfully moved appointment"
        );
        Ok(updated)
    }

    /// Publish a refresh hint for `date`. The snapshot is best-effort: a
    /// failed read still publishes, without slots.
    async fn publish_for(&self, date: NaiveDate, cause: SlotChange) {
        let available_slots = match self.list_available_slots(date).await {
            Ok(slots) => Some(slots),
            Err(e) => {
                warn!(error = %e, "Could not snapshot slots for live update");
                None
            }
        };
        self.events.publish(&SlotsDomainEvent {
            date,
            available_slots,
            cause,
            at: Utc::now(),
        });
    }

    /// Run a store call under the configured deadline.
    async fn store<T, F>(&self, op: &'static str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(op, error = %format!("{e:#}"), "Store call failed");
                Err(DomainError::store_unavailable(format!("{op}: {e}")))
            }
            Err(_) => {
                warn!(op, timeout = ?self.config.store_timeout, "Store call timed out");
                Err(DomainError::store_unavailable(format!(
                    "{op} timed out after {:?}",
                    self.config.store_timeout
                )))
            }
        }
    }

    // --- validation helpers ---

    /// Returns the total duration on success.
    fn validate_new_appointment(&self, new: &NewAppointment) -> Result<u32, DomainError> {
        for (field, value) in [
            ("name", &new.customer.name),
            ("phone", &new.customer.phone),
            ("email", &new.customer.email),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(field, "is required"));
            }
        }
        if new.services.is_empty() {
            return Err(DomainError::validation(
                "services",
                "at least one service is required",
            ));
        }

        let mut duration: u32 = 0;
        for (i, s) in new.services.iter().enumerate() {
            if s.name.trim().is_empty() {
                return Err(DomainError::validation(
                    format!("services[{i}].name"),
                    "is required",
                ));
            }
            if s.duration_minutes == 0 {
                return Err(DomainError::validation(
                    format!("services[{i}].durationMinutes"),
                    "must be positive",
                ));
            }
            if s.price < Decimal::ZERO {
                return Err(DomainError::validation(
                    format!("services[{i}].price"),
                    "must not be negative",
                ));
            }
            duration = duration.saturating_add(s.duration_minutes);
        }
        if duration > MAX_DURATION_MINUTES {
            return Err(DomainError::validation(
                "services",
                format!("total duration {duration} exceeds {MAX_DURATION_MINUTES} minutes"),
            ));
        }

        if let Some(total) = new.total_price {
            if total < Decimal::ZERO {
                return Err(DomainError::validation("totalPrice", "must not be negative"));
            }
        }
        Ok(duration)
    }

    fn validate_slot(&self, date: NaiveDate, start_time: SlotTime) -> Result<(), DomainError> {
        let hours = &self.config.hours;
        if !hours.contains(start_time) {
            return Err(DomainError::outside_operating_hours(start_time));
        }
        if self.config.require_aligned_start && !hours.is_aligned(start_time) {
            return Err(DomainError::validation(
                "time",
                format!(
                    "{start_time} is not on the {}-minute slot grid",
                    hours.granularity_minutes()
                ),
            ));
        }
        let at = date.and_time(start_time.to_naive_time());
        if at < self.clock.now_local() {
            return Err(DomainError::past_booking(at));
        }
        Ok(())
    }
}

/// Reject `candidate` if it overlaps any appointment except `exclude`.
fn check_conflict(
    date: NaiveDate,
    existing: &[Appointment],
    candidate: Interval,
    exclude: Option<Uuid>,
) -> Result<(), DomainError> {
    match existing
        .iter()
        .filter(|a| Some(a.id) != exclude)
        .find(|a| a.interval().overlaps(&candidate))
    {
        Some(hit) => {
            debug!(conflicting_id = %hit.id, "Slot conflict");
            Err(DomainError::conflict(date, hit.interval(), hit.id))
        }
        None => Ok(()),
    }
}

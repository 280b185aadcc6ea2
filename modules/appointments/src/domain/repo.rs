use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::contract::model::{Appointment, Customer, ServiceItem, SlotTime};

/// Everything the allocator decided about a booking; the store adds the
/// identifier and timestamps on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentRecord {
    pub date: NaiveDate,
    pub start_time: SlotTime,
    pub duration_minutes: u32,
    pub services: Vec<ServiceItem>,
    pub total_price: Decimal,
    pub ticket_number: u64,
    pub customer: Customer,
}

/// Fields a staff edit may change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppointmentUpdate {
    pub customer_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<SlotTime>,
}

/// Port for the domain layer: persistence operations the allocator needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// Single-record writes are assumed atomic; nothing here makes a read and a
/// later write atomic together.
#[async_trait]
pub trait AppointmentsRepository: Send + Sync {
    /// All appointments on a day, in no particular order.
    async fn find_by_date(&self, date: NaiveDate) -> anyhow::Result<Vec<Appointment>>;
    /// Load an appointment by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Appointment>>;
    /// Every stored appointment, in no particular order.
    async fn list_all(&self) -> anyhow::Result<Vec<Appointment>>;
    /// Persist a new appointment and assign its identifier.
    async fn insert(&self, record: AppointmentRecord) -> anyhow::Result<Appointment>;
    /// Apply a partial update. `None` when the id is unknown.
    async fn update(&self, id: Uuid, update: AppointmentUpdate)
        -> anyhow::Result<Option<Appointment>>;
    /// Delete by id, returning the removed record.
    async fn delete(&self, id: Uuid) -> anyhow::Result<Option<Appointment>>;
    /// Highest ticket number currently stored (0 when empty).
    async fn max_ticket_number(&self) -> anyhow::Result<u64>;
    /// Atomically reserve the next ticket number. Never returns a number
    /// handed out before, even if that appointment was deleted since.
    async fn next_ticket_number(&self) -> anyhow::Result<u64>;
}

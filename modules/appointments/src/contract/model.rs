use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

pub use crate::domain::slots::SlotTime;

/// One selected salon service. Order inside an appointment is display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceItem {
    pub name: String,
    pub duration_minutes: u32,
    pub price: Decimal,
}

/// Contact details; opaque to the allocator apart from presence checks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Pure appointment model for inter-module communication (no serde/schemars)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: SlotTime,
    pub duration_minutes: u32,
    pub services: Vec<ServiceItem>,
    pub total_price: Decimal,
    pub ticket_number: u64,
    pub customer: Customer,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn interval(&self) -> crate::domain::slots::Interval {
        crate::domain::slots::Interval::new(self.start_time, self.duration_minutes)
    }
}

/// Booking request as seen by the allocator.
///
/// `total_price` is an explicit quote from the caller; when absent the total
/// is the sum of the service prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub date: NaiveDate,
    pub start_time: SlotTime,
    pub services: Vec<ServiceItem>,
    pub total_price: Option<Decimal>,
    pub customer: Customer,
}

/// Partial staff edit of an appointment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppointmentPatch {
    pub customer_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<SlotTime>,
}

impl AppointmentPatch {
    pub fn moves(&self) -> bool {
        self.date.is_some() || self.start_time.is_some()
    }

    /// True when the patch names a date or start different from `current`'s.
    pub fn changes_slot_of(&self, current: &Appointment) -> bool {
        self.date.is_some_and(|d| d != current.date)
            || self.start_time.is_some_and(|t| t != current.start_time)
    }
}

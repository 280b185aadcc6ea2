use chrono::{DateTime, NaiveDate, Utc};

use crate::contract::model::SlotTime;

/// What changed the calendar of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotChange {
    Booked,
    Rescheduled,
    Cancelled,
}

/// Transport-agnostic domain event: the free slots of `date` changed.
///
/// `available_slots` is a convenience snapshot and may be absent; receivers
/// treat the event as a hint to re-fetch, never as an authoritative diff.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotsDomainEvent {
    pub date: NaiveDate,
    pub available_slots: Option<Vec<SlotTime>>,
    pub cause: SlotChange,
    pub at: DateTime<Utc>,
}

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::slots::{Interval, SlotTime};

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("You cannot select a past date/time ({at})")]
    PastBooking { at: NaiveDateTime },

    #[error("Start time {start} is outside operating hours")]
    OutsideOperatingHours { start: SlotTime },

    #[error(
        "This slot overlaps with another appointment on {date} ({}). Please choose another time.",
        fmt_interval(.existing)
    )]
    Conflict {
        date: NaiveDate,
        existing: Interval,
        conflicting_id: Uuid,
    },

    #[error("Appointment not found: {id}")]
    NotFound { id: Uuid },

    #[error("Appointment store unavailable: {message}")]
    StoreUnavailable { message: String },
}

fn fmt_interval(iv: &Interval) -> String {
    format!(
        "{:02}:{:02}-{:02}:{:02}",
        iv.start / 60,
        iv.start % 60,
        iv.end / 60,
        iv.end % 60
    )
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn past_booking(at: NaiveDateTime) -> Self {
        Self::PastBooking { at }
    }

    pub fn outside_operating_hours(start: SlotTime) -> Self {
        Self::OutsideOperatingHours { start }
    }

    pub fn conflict(date: NaiveDate, existing: Interval, conflicting_id: Uuid) -> Self {
        Self::Conflict {
            date,
            existing,
            conflicting_id,
        }
    }

    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }
}

use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone)]
pub enum AppointmentsError {
    #[error("Appointment not found: {id}")]
    NotFound { id: Uuid },

    #[error("Slot conflict: {message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl AppointmentsError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for AppointmentsError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            NotFound { id } => Self::not_found(id),
            e @ Conflict { .. } => Self::conflict(e.to_string()),
            Validation { field, message } => Self::validation(format!("{}: {}", field, message)),
            e @ (PastBooking { .. } | OutsideOperatingHours { .. }) => {
                Self::validation(e.to_string())
            }
            StoreUnavailable { .. } => Self::internal(),
        }
    }
}

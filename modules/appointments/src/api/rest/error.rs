use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.salon.local/{code}"))
        .with_code(code)
        .with_instance(instance);

    let problem = if let Some(id) = tracing::Span::current().id() {
        problem.with_trace_id(id.into_u64().to_string())
    } else {
        problem
    };

    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "APPOINTMENTS_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        ),
        DomainError::PastBooking { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "APPOINTMENTS_PAST_BOOKING",
            "Past date/time",
            e.to_string(),
            instance,
        ),
        DomainError::OutsideOperatingHours { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "APPOINTMENTS_OUTSIDE_HOURS",
            "Outside operating hours",
            e.to_string(),
            instance,
        ),
        DomainError::Conflict { .. } => from_parts(
            StatusCode::CONFLICT,
            "APPOINTMENTS_SLOT_CONFLICT",
            "Slot conflict",
            e.to_string(),
            instance,
        ),
        DomainError::NotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "APPOINTMENTS_NOT_FOUND",
            "Appointment not found",
            format!("Appointment with id {id} was not found"),
            instance,
        ),
        DomainError::StoreUnavailable { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Appointment store unavailable");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "APPOINTMENTS_STORE_UNAVAILABLE",
                "Internal error",
                "The appointment store is temporarily unavailable",
                instance,
            )
        }
    }
}

/// Malformed request bodies or query strings.
pub fn bad_request(detail: impl Into<String>, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "APPOINTMENTS_VALIDATION",
        "Validation error",
        detail,
        instance,
    )
}

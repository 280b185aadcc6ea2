use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json},
    Extension,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    AppointmentDto, AppointmentListDto, AvailableSlotsDto, BookAppointmentReq,
    CatalogServiceDto, ListAppointmentsQuery, PriceQuery, PriceQuoteDto, ServiceCatalogDto,
    SlotsEvent, SlotsQuery, UpdateAppointmentReq,
};
use crate::api::rest::error::{bad_request, map_domain_error};
use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::api::rest::sse::SseBroadcaster;
use crate::contract::model::{AppointmentPatch, NewAppointment};
use crate::domain::service::Service;
use crate::domain::slots::parse_date;

/// SSE event name for slot updates.
pub const SLOTS_EVENT_NAME: &str = "slotsUpdated";

/// Free slot starts for a day. Starts already in the past are left out.
#[utoipa::path(
    get,
    path = "/slots/available",
    tag = "slots",
    operation_id = "appointments.available_slots",
    params(("date" = String, Query, description = "Day to inspect, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Free slot starts, ascending", body = AvailableSlotsDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn available_slots(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<SlotsQuery>,
    uri: Uri,
) -> Result<Json<AvailableSlotsDto>, ProblemResponse> {
    info!("Listing available slots: {:?}", query);

    let raw = query
        .date
        .ok_or_else(|| bad_request("Query parameter 'date' is required", uri.path()))?;
    let date = parse_date(raw.trim()).map_err(|e| map_domain_error(&e, uri.path()))?;

    match svc.list_available_slots(date).await {
        Ok(slots) => {
            let now = svc.clock().now_local();
            let available_slots = slots
                .into_iter()
                .filter(|t| date.and_time(t.to_naive_time()) >= now)
                .map(|t| t.to_string())
                .collect();
            Ok(Json(AvailableSlotsDto {
                date: date.format("%Y-%m-%d").to_string(),
                available_slots,
            }))
        }
        Err(e) => {
            error!("Failed to list available slots for {}: {}", date, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// SSE endpoint returning a live stream of `SlotsEvent`.
#[utoipa::path(
    get,
    path = "/slots/events",
    tag = "slots",
    operation_id = "appointments.slots_events",
    responses(
        (status = 200, description = "SSE stream of SlotsEvent", body = SlotsEvent, content_type = "text/event-stream")
    )
)]
pub async fn slots_events(
    Extension(sse): Extension<SseBroadcaster<SlotsEvent>>,
) -> impl IntoResponse {
    info!("New SSE connection for slot updates");
    sse.sse_response_named(SLOTS_EVENT_NAME)
}

/// Book an appointment
#[utoipa::path(
    post,
    path = "/appointments",
    tag = "appointments",
    operation_id = "appointments.book",
    request_body = BookAppointmentReq,
    responses(
        (status = 201, description = "Booked appointment", body = AppointmentDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Slot conflict", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn book_appointment(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    body: Result<Json<BookAppointmentReq>, JsonRejection>,
) -> Result<(StatusCode, Json<AppointmentDto>), ProblemResponse> {
    let Json(req_body) = body.map_err(|e| bad_request(e.body_text(), uri.path()))?;
    info!(date = %req_body.date, time = %req_body.time, "Booking appointment");

    let new = NewAppointment::try_from(req_body).map_err(|e| map_domain_error(&e, uri.path()))?;

    match svc.try_book(new).await {
        Ok(appointment) => Ok((StatusCode::CREATED, Json(AppointmentDto::from(appointment)))),
        Err(e) => {
            error!("Failed to book appointment: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List appointments, optionally for one day
#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    operation_id = "appointments.list",
    params(("date" = Option<String>, Query, description = "Restrict to one day, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Appointments ordered by date and time", body = AppointmentListDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_appointments(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<ListAppointmentsQuery>,
    uri: Uri,
) -> Result<Json<AppointmentListDto>, ProblemResponse> {
    info!("Listing appointments with query: {:?}", query);

    let date = query
        .date
        .as_deref()
        .map(|d| parse_date(d.trim()))
        .transpose()
        .map_err(|e| map_domain_error(&e, uri.path()))?;

    match svc.list_appointments(date).await {
        Ok(items) => {
            let appointments: Vec<AppointmentDto> =
                items.into_iter().map(AppointmentDto::from).collect();
            Ok(Json(AppointmentListDto {
                total: appointments.len(),
                appointments,
            }))
        }
        Err(e) => {
            error!("Failed to list appointments: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get an appointment by ID
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    operation_id = "appointments.get",
    params(("id" = Uuid, Path, description = "Appointment UUID")),
    responses(
        (status = 200, description = "Appointment found", body = AppointmentDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_appointment(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    uri: Uri,
) -> Result<Json<AppointmentDto>, ProblemResponse> {
    info!("Getting appointment with id: {}", id);

    match svc.get_appointment(id).await {
        Ok(appointment) => Ok(Json(AppointmentDto::from(appointment))),
        Err(e) => {
            error!("Failed to get appointment {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Staff edit: rename and/or move an appointment
#[utoipa::path(
    put,
    path = "/appointments/{id}",
    tag = "appointments",
    operation_id = "appointments.update",
    params(("id" = Uuid, Path, description = "Appointment UUID")),
    request_body = UpdateAppointmentReq,
    responses(
        (status = 200, description = "Updated appointment", body = AppointmentDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Slot conflict", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn update_appointment(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateAppointmentReq>, JsonRejection>,
) -> Result<Json<AppointmentDto>, ProblemResponse> {
    let Json(req_body) = body.map_err(|e| bad_request(e.body_text(), uri.path()))?;
    info!("Updating appointment {} with: {:?}", id, req_body);

    let patch = AppointmentPatch::try_from(req_body).map_err(|e| map_domain_error(&e, uri.path()))?;

    match svc.update_appointment(id, patch).await {
        Ok(appointment) => Ok(Json(AppointmentDto::from(appointment))),
        Err(e) => {
            error!("Failed to update appointment {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Cancel an appointment, freeing its slots
#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    tag = "appointments",
    operation_id = "appointments.cancel",
    params(("id" = Uuid, Path, description = "Appointment UUID")),
    responses(
        (status = 204, description = "Appointment cancelled"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn cancel_appointment(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<Uuid>,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    info!("Cancelling appointment: {}", id);

    match svc.cancel(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to cancel appointment {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// The salon's service menu
#[utoipa::path(
    get,
    path = "/services",
    tag = "services",
    operation_id = "appointments.list_services",
    responses(
        (status = 200, description = "Menu entries ordered by id", body = ServiceCatalogDto)
    )
)]
pub async fn list_services(Extension(svc): Extension<Arc<Service>>) -> Json<ServiceCatalogDto> {
    info!("Listing service menu");
    Json(ServiceCatalogDto {
        services: svc
            .list_services()
            .into_iter()
            .map(CatalogServiceDto::from)
            .collect(),
    })
}

/// Total price and duration of a selection of menu ids
#[utoipa::path(
    get,
    path = "/services/calculate-price",
    tag = "services",
    operation_id = "appointments.calculate_price",
    params(("selectedServices" = String, Query, description = "Comma-separated menu ids, e.g. haircut,spa")),
    responses(
        (status = 200, description = "Totals for the selection", body = PriceQuoteDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn calculate_price(
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<PriceQuery>,
    uri: Uri,
) -> Result<Json<PriceQuoteDto>, ProblemResponse> {
    info!("Calculating price: {:?}", query);

    let ids: Vec<String> = query
        .selected_services
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::to_owned)
        .collect();

    svc.quote_services(&ids)
        .map(|q| Json(PriceQuoteDto::from(q)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

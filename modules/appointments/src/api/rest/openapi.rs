use axum::Json;
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers, problem};

#[derive(OpenApi)]
#[openapi(
    info(title = "Salon appointments API"),
    paths(
        handlers::available_slots,
        handlers::slots_events,
        handlers::book_appointment,
        handlers::list_appointments,
        handlers::get_appointment,
        handlers::update_appointment,
        handlers::cancel_appointment,
        handlers::list_services,
        handlers::calculate_price,
    ),
    components(schemas(
        dto::ServiceItemDto,
        dto::ServiceReq,
        dto::BookAppointmentReq,
        dto::UpdateAppointmentReq,
        dto::AppointmentDto,
        dto::AppointmentListDto,
        dto::AvailableSlotsDto,
        dto::SlotsEvent,
        dto::CatalogServiceDto,
        dto::ServiceCatalogDto,
        dto::PriceQuoteDto,
        problem::Problem,
    )),
    tags(
        (name = "appointments", description = "Bookings, staff edits and cancellations"),
        (name = "slots", description = "Availability and live slot updates"),
        (name = "services", description = "Service menu and price calculator")
    )
)]
pub struct ApiDoc;

/// `GET /openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

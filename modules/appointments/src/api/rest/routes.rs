use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::api::rest::{dto::SlotsEvent, handlers, sse::SseBroadcaster};
use crate::domain::service::Service;

/// Mount the appointments and slots routes on `router`.
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    sse: SseBroadcaster<SlotsEvent>,
) -> Router {
    let module = Router::new()
        .route("/slots/available", get(handlers::available_slots))
        .route("/slots/events", get(handlers::slots_events))
        .route("/services", get(handlers::list_services))
        .route("/services/calculate-price", get(handlers::calculate_price))
        .route(
            "/appointments",
            get(handlers::list_appointments).post(handlers::book_appointment),
        )
        .route(
            "/appointments/{id}",
            get(handlers::get_appointment)
                .put(handlers::update_appointment)
                .delete(handlers::cancel_appointment),
        )
        .layer(Extension(service))
        .layer(Extension(sse));

    router.merge(module)
}

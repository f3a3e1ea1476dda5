//! Customer API
//!
//! Customers, their vehicles (with PPF preferences) and job history.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/customers", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/jobs", get(handler::jobs))
        .route(
            "/{id}/vehicles",
            get(handler::list_vehicles).post(handler::add_vehicle),
        )
        .route(
            "/{id}/vehicles/{vehicle_id}",
            put(handler::update_vehicle).delete(handler::delete_vehicle),
        )
}

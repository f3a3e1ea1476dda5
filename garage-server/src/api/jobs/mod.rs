//! Job API
//!
//! The service funnel: jobs move `new → inspection → in_progress →
//! quality_check → completed` (or `cancelled`). Completion issues the
//! invoice and queues the customer notification.

mod handler;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/jobs", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/funnel", get(handler::funnel))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/stage", patch(handler::change_stage))
        .route("/{id}/technician", patch(handler::assign_technician))
        .route("/{id}/payments", post(handler::add_payment))
        .route("/{id}/payments/{payment_id}", delete(handler::remove_payment))
        .route("/{id}/materials", post(handler::add_materials))
        .route("/{id}/materials/{material_id}", delete(handler::remove_material))
        .route(
            "/{id}/invoice",
            get(handler::get_invoice).post(handler::generate_invoice),
        )
}

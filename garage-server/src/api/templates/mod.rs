//! WhatsApp template API
//!
//! Bodies use `{{placeholder}}` variables. Events `job_completed` and
//! `payment_received` are rendered automatically by the notification outbox.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/templates", routes())
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
        .route("/{id}/preview", post(handler::preview))
}

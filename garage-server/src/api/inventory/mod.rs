//! Inventory API
//!
//! | Path | Method | Notes |
//! |------|--------|-------|
//! | /api/inventory | GET | `?category=`, `?low_stock=true` |
//! | /api/inventory | POST | create item |
//! | /api/inventory/low-stock | GET | items at or below reorder level |
//! | /api/inventory/{id} | GET / PUT / DELETE | delete refused once used by a job |
//! | /api/inventory/{id}/rolls | POST | register a film roll |
//! | /api/inventory/{id}/rolls/{roll_id} | DELETE | only rolls never cut |
//! | /api/inventory/{id}/adjust | POST | stock correction (non-roll items) |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/inventory", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/low-stock", get(handler::low_stock))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/rolls", post(handler::add_roll))
        .route("/{id}/rolls/{roll_id}", delete(handler::delete_roll))
        .route("/{id}/adjust", post(handler::adjust))
}

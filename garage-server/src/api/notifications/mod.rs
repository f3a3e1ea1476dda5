//! Notification outbox API
//!
//! Read-only view of queued WhatsApp messages.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::models::Notification;

use crate::core::ServerState;
use crate::db::repository::notification;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/notifications", get(list))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub job_id: Option<i64>,
}

/// GET /api/notifications?job_id= - newest first
async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    Ok(Json(notification::find_all(&state.pool, query.job_id).await?))
}

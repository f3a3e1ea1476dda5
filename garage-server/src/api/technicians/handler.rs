//! Technician API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{Job, Technician, TechnicianCreate, TechnicianUpdate};

use crate::api::repo_error;
use crate::core::ServerState;
use crate::db::repository::job::JobFilter;
use crate::db::repository::{job, technician};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

async fn require(state: &ServerState, id: i64) -> AppResult<Technician> {
    technician::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TechnicianNotFound).with_detail("technician_id", id))
}

/// GET /api/technicians?include_inactive=true
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Technician>>> {
    Ok(Json(technician::find_all(&state.pool, query.include_inactive).await?))
}

/// GET /api/technicians/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Technician>> {
    Ok(Json(require(&state, id).await?))
}

/// POST /api/technicians
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TechnicianCreate>,
) -> AppResult<Json<Technician>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.specialty, "specialty", MAX_SHORT_TEXT_LEN)?;
    Ok(Json(technician::create(&state.pool, payload).await?))
}

/// PUT /api/technicians/:id - also reactivates with `is_active: true`
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TechnicianUpdate>,
) -> AppResult<Json<Technician>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.specialty, "specialty", MAX_SHORT_TEXT_LEN)?;
    let updated = technician::update(&state.pool, id, payload)
        .await
        .map_err(repo_error(ErrorCode::TechnicianNotFound, ErrorCode::AlreadyExists))?;
    Ok(Json(updated))
}

/// DELETE /api/technicians/:id - deactivate
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    require(&state, id).await?;
    let result = technician::delete(&state.pool, id).await?;
    if result {
        tracing::info!(technician_id = id, "Technician deactivated");
    }
    Ok(Json(result))
}

/// GET /api/technicians/:id/jobs
pub async fn jobs(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Job>>> {
    require(&state, id).await?;
    let filter = JobFilter {
        technician_id: Some(id),
        ..Default::default()
    };
    Ok(Json(job::find_all(&state.pool, &filter).await?))
}

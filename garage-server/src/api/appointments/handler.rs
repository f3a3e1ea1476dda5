//! Appointment API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::ErrorCode;
use shared::models::{
    Appointment, AppointmentCreate, AppointmentStatusChange, AppointmentUpdate, Job,
};

use crate::core::ServerState;
use crate::db::repository::appointment::{self, AppointmentFilter};
use crate::services::scheduling;
use crate::utils::{AppError, AppResult};

/// GET /api/appointments?from=&to=&status= - ordered by start time
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<AppointmentFilter>,
) -> AppResult<Json<Vec<Appointment>>> {
    Ok(Json(appointment::find_all(&state.pool, &filter).await?))
}

/// GET /api/appointments/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Appointment>> {
    let appt = appointment::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AppointmentNotFound).with_detail("appointment_id", id))?;
    Ok(Json(appt))
}

/// POST /api/appointments
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AppointmentCreate>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(scheduling::create(&state.pool, &payload).await?))
}

/// PUT /api/appointments/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AppointmentUpdate>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(scheduling::update(&state.pool, id, &payload).await?))
}

/// DELETE /api/appointments/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = appointment::delete(&state.pool, id).await?;
    if !result {
        return Err(AppError::new(ErrorCode::AppointmentNotFound).with_detail("appointment_id", id));
    }
    Ok(Json(result))
}

/// PATCH /api/appointments/:id/status
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AppointmentStatusChange>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(
        scheduling::change_status(&state.pool, id, payload.status).await?,
    ))
}

/// POST /api/appointments/:id/convert - create a job from the booking
pub async fn convert(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Job>> {
    Ok(Json(scheduling::convert(&state.pool, id).await?))
}

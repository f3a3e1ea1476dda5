//! Price Inquiry API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{
    InquiryConversion, InquiryCreate, InquiryStatus, InquiryStatusChange, InquiryUpdate,
    PriceInquiry,
};

use crate::api::repo_error;
use crate::core::ServerState;
use crate::db::repository::inquiry;
use crate::services::leads;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<InquiryStatus>,
}

async fn require(state: &ServerState, id: i64) -> AppResult<PriceInquiry> {
    inquiry::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InquiryNotFound).with_detail("inquiry_id", id))
}

/// GET /api/inquiries?status=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<PriceInquiry>>> {
    Ok(Json(inquiry::find_all(&state.pool, query.status).await?))
}

/// GET /api/inquiries/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PriceInquiry>> {
    Ok(Json(require(&state, id).await?))
}

/// POST /api/inquiries
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<InquiryCreate>,
) -> AppResult<Json<PriceInquiry>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.service_type, "service_type", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.vehicle_make, "vehicle_make", MAX_NAME_LEN)?;
    validate_optional_text(&payload.vehicle_model, "vehicle_model", MAX_NAME_LEN)?;
    validate_optional_text(&payload.message, "message", MAX_NOTE_LEN)?;
    validate_non_negative(payload.quoted_price, "quoted_price")?;

    let created = inquiry::create(&state.pool, payload).await?;
    tracing::info!(inquiry_id = created.id, service_type = %created.service_type, "Price inquiry received");
    Ok(Json(created))
}

/// PUT /api/inquiries/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<InquiryUpdate>,
) -> AppResult<Json<PriceInquiry>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(phone) = &payload.phone {
        validate_required_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.message, "message", MAX_NOTE_LEN)?;
    validate_non_negative(payload.quoted_price, "quoted_price")?;

    let updated = inquiry::update(&state.pool, id, payload)
        .await
        .map_err(repo_error(ErrorCode::InquiryNotFound, ErrorCode::AlreadyExists))?;
    Ok(Json(updated))
}

/// DELETE /api/inquiries/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    require(&state, id).await?;
    Ok(Json(inquiry::delete(&state.pool, id).await?))
}

/// PATCH /api/inquiries/:id/status - `converted` is reserved for the convert route
pub async fn change_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<InquiryStatusChange>,
) -> AppResult<Json<PriceInquiry>> {
    if payload.status == InquiryStatus::Converted {
        return Err(AppError::validation(
            "use POST /api/inquiries/{id}/convert to convert an inquiry",
        ));
    }
    let current = require(&state, id).await?;
    if current.status == InquiryStatus::Converted {
        return Err(AppError::new(ErrorCode::InquiryAlreadyConverted).with_detail("inquiry_id", id));
    }
    inquiry::set_status(&state.pool, id, payload.status).await?;
    Ok(Json(require(&state, id).await?))
}

/// POST /api/inquiries/:id/convert - find or create the customer by phone
pub async fn convert(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<InquiryConversion>> {
    Ok(Json(leads::convert(&state.pool, id).await?))
}

//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{Customer, CustomerCreate, CustomerUpdate, Job, Vehicle, VehicleCreate, VehicleUpdate};

use crate::api::repo_error;
use crate::core::ServerState;
use crate::db::repository::job::JobFilter;
use crate::db::repository::{customer, job, vehicle};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN,
    validate_non_negative, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

fn validate_vehicle(v: &VehicleCreate) -> AppResult<()> {
    validate_required_text(&v.make, "make", MAX_NAME_LEN)?;
    validate_required_text(&v.model, "model", MAX_NAME_LEN)?;
    validate_optional_text(&v.plate_number, "plate_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&v.vin, "vin", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&v.color, "color", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&v.ppf_category, "ppf_category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&v.ppf_variant, "ppf_variant", MAX_SHORT_TEXT_LEN)?;
    validate_non_negative(v.ppf_quoted_price, "ppf_quoted_price")?;
    Ok(())
}

async fn require_customer(state: &ServerState, id: i64) -> AppResult<Customer> {
    customer::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CustomerNotFound).with_detail("customer_id", id))
}

/// Vehicle `vehicle_id`, only if it belongs to customer `id`
async fn require_vehicle(state: &ServerState, id: i64, vehicle_id: i64) -> AppResult<Vehicle> {
    vehicle::find_by_id(&state.pool, vehicle_id)
        .await?
        .filter(|v| v.customer_id == id)
        .ok_or_else(|| AppError::new(ErrorCode::VehicleNotFound).with_detail("vehicle_id", vehicle_id))
}

/// GET /api/customers?q= - list, optionally searching name / phone / plate
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let customers = customer::find_all(&state.pool, query.q.as_deref()).await?;
    Ok(Json(customers))
}

/// GET /api/customers/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    Ok(Json(require_customer(&state, id).await?))
}

/// POST /api/customers
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    for v in &payload.vehicles {
        validate_vehicle(v)?;
    }

    let created = customer::create(&state.pool, payload)
        .await
        .map_err(repo_error(ErrorCode::CustomerNotFound, ErrorCode::CustomerPhoneExists))?;
    tracing::info!(customer_id = created.id, vehicles = created.vehicles.len(), "Customer created");
    Ok(Json(created))
}

/// PUT /api/customers/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(phone) = &payload.phone {
        validate_required_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    let updated = customer::update(&state.pool, id, payload)
        .await
        .map_err(repo_error(ErrorCode::CustomerNotFound, ErrorCode::CustomerPhoneExists))?;
    Ok(Json(updated))
}

/// DELETE /api/customers/:id - refused while jobs reference the customer
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let existing = require_customer(&state, id).await?;
    let jobs = job::count_for_customer(&state.pool, id).await?;
    if jobs > 0 {
        return Err(AppError::with_message(
            ErrorCode::CustomerHasJobs,
            format!("{} has {jobs} job(s)", existing.name),
        ));
    }
    let result = customer::delete(&state.pool, id).await?;
    if result {
        tracing::info!(customer_id = id, "Customer deleted");
    }
    Ok(Json(result))
}

/// GET /api/customers/:id/jobs - job history, newest first
pub async fn jobs(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Job>>> {
    require_customer(&state, id).await?;
    let filter = JobFilter {
        customer_id: Some(id),
        ..Default::default()
    };
    Ok(Json(job::find_all(&state.pool, &filter).await?))
}

/// GET /api/customers/:id/vehicles
pub async fn list_vehicles(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Vehicle>>> {
    Ok(Json(require_customer(&state, id).await?.vehicles))
}

/// POST /api/customers/:id/vehicles
pub async fn add_vehicle(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<VehicleCreate>,
) -> AppResult<Json<Vehicle>> {
    validate_vehicle(&payload)?;
    require_customer(&state, id).await?;
    let created = vehicle::create(&state.pool, id, payload).await?;
    Ok(Json(created))
}

/// PUT /api/customers/:id/vehicles/:vehicle_id
pub async fn update_vehicle(
    State(state): State<ServerState>,
    Path((id, vehicle_id)): Path<(i64, i64)>,
    Json(payload): Json<VehicleUpdate>,
) -> AppResult<Json<Vehicle>> {
    if let Some(make) = &payload.make {
        validate_required_text(make, "make", MAX_NAME_LEN)?;
    }
    if let Some(model) = &payload.model {
        validate_required_text(model, "model", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.plate_number, "plate_number", MAX_SHORT_TEXT_LEN)?;
    validate_non_negative(payload.ppf_quoted_price, "ppf_quoted_price")?;

    require_vehicle(&state, id, vehicle_id).await?;
    let updated = vehicle::update(&state.pool, vehicle_id, payload)
        .await
        .map_err(repo_error(ErrorCode::VehicleNotFound, ErrorCode::AlreadyExists))?;
    Ok(Json(updated))
}

/// DELETE /api/customers/:id/vehicles/:vehicle_id - refused while jobs reference it
pub async fn delete_vehicle(
    State(state): State<ServerState>,
    Path((id, vehicle_id)): Path<(i64, i64)>,
) -> AppResult<Json<bool>> {
    let existing = require_vehicle(&state, id, vehicle_id).await?;
    let jobs = job::count_for_vehicle(&state.pool, vehicle_id).await?;
    if jobs > 0 {
        return Err(AppError::with_message(
            ErrorCode::VehicleHasJobs,
            format!("{} has {jobs} job(s)", existing.display_name()),
        ));
    }
    Ok(Json(vehicle::delete(&state.pool, vehicle_id).await?))
}

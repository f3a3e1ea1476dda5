//! Appointment booking
//!
//! Technicians hold at most one active (scheduled or confirmed) appointment
//! at a time. Conversion turns a booking into a job in the same transaction.

use shared::error::ErrorCode;
use shared::models::{
    Appointment, AppointmentCreate, AppointmentStatus, AppointmentUpdate, Job, JobCreate,
};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::appointment::{self, AppointmentRow};
use crate::db::repository::{customer, job, technician, vehicle};
use crate::db;
use crate::services::jobs;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

pub const DEFAULT_DURATION_MINUTES: i32 = 60;
/// One working day
const MAX_DURATION_MINUTES: i32 = 24 * 60;

fn validate_slot(scheduled_at: i64, duration_minutes: i32) -> AppResult<()> {
    if scheduled_at <= 0 {
        return Err(AppError::validation("scheduled_at must be a Unix timestamp in milliseconds"));
    }
    if !(1..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(AppError::validation(format!(
            "duration_minutes must be between 1 and {MAX_DURATION_MINUTES}, got {duration_minutes}"
        )));
    }
    Ok(())
}

async fn require(conn: &mut SqliteConnection, id: i64) -> AppResult<Appointment> {
    appointment::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AppointmentNotFound).with_detail("appointment_id", id))
}

fn closed(appt: &Appointment) -> AppError {
    AppError::with_message(
        ErrorCode::AppointmentClosed,
        format!("Appointment is {:?} and can no longer change", appt.status),
    )
    .with_detail("appointment_id", appt.id)
}

/// Vehicle label for `vehicle_id`, which must belong to `customer_id`
async fn vehicle_label(
    conn: &mut SqliteConnection,
    customer_id: i64,
    vehicle_id: Option<i64>,
) -> AppResult<Option<String>> {
    let Some(vid) = vehicle_id else {
        return Ok(None);
    };
    let veh = vehicle::find_by_id(&mut *conn, vid)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VehicleNotFound).with_detail("vehicle_id", vid))?;
    if veh.customer_id != customer_id {
        return Err(AppError::new(ErrorCode::VehicleNotOwned)
            .with_detail("vehicle_id", vid)
            .with_detail("customer_id", customer_id));
    }
    Ok(Some(veh.display_name()))
}

/// Technician must exist, be active and be free for the slot
async fn check_technician(
    conn: &mut SqliteConnection,
    technician_id: Option<i64>,
    scheduled_at: i64,
    duration_minutes: i32,
    exclude_id: Option<i64>,
) -> AppResult<()> {
    let Some(tid) = technician_id else {
        return Ok(());
    };
    let tech = technician::find_by_id(&mut *conn, tid)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TechnicianNotFound).with_detail("technician_id", tid))?;
    if !tech.is_active {
        return Err(AppError::with_message(
            ErrorCode::TechnicianInactive,
            format!("Technician {} is inactive", tech.name),
        ));
    }
    let end = scheduled_at + i64::from(duration_minutes) * 60_000;
    if appointment::has_overlap(&mut *conn, tid, scheduled_at, end, exclude_id).await? {
        return Err(AppError::with_message(
            ErrorCode::AppointmentConflict,
            format!("{} already has an appointment in this slot", tech.name),
        )
        .with_detail("technician_id", tid)
        .with_detail("scheduled_at", scheduled_at));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: &AppointmentCreate) -> AppResult<Appointment> {
    validate_required_text(&data.service_type, "service_type", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
    let duration = data.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    validate_slot(data.scheduled_at, duration)?;

    let mut tx = db::begin(pool).await?;
    let cust = customer::find_by_id(&mut *tx, data.customer_id)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::CustomerNotFound).with_detail("customer_id", data.customer_id)
        })?;
    let vehicle_name = vehicle_label(&mut tx, cust.id, data.vehicle_id).await?;
    check_technician(&mut tx, data.technician_id, data.scheduled_at, duration, None).await?;

    let id = appointment::insert(
        &mut tx,
        &AppointmentRow {
            customer_id: cust.id,
            customer_name: &cust.name,
            vehicle_id: data.vehicle_id,
            vehicle_name: vehicle_name.as_deref(),
            technician_id: data.technician_id,
            service_type: &data.service_type,
            scheduled_at: data.scheduled_at,
            duration_minutes: duration,
            notes: data.notes.as_deref(),
        },
    )
    .await?;
    let created = require(&mut tx, id).await?;
    db::commit(tx).await?;

    tracing::info!(
        appointment_id = id,
        customer_id = cust.id,
        scheduled_at = data.scheduled_at,
        "Appointment booked"
    );
    Ok(created)
}

/// Reschedule or edit an open appointment
pub async fn update(pool: &SqlitePool, id: i64, data: &AppointmentUpdate) -> AppResult<Appointment> {
    if let Some(service_type) = &data.service_type {
        validate_required_text(service_type, "service_type", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;

    let mut tx = db::begin(pool).await?;
    let current = require(&mut tx, id).await?;
    if current.status.is_final() {
        return Err(closed(&current));
    }

    let scheduled_at = data.scheduled_at.unwrap_or(current.scheduled_at);
    let duration = data.duration_minutes.unwrap_or(current.duration_minutes);
    validate_slot(scheduled_at, duration)?;

    let vehicle_id = data.vehicle_id.or(current.vehicle_id);
    let vehicle_name = match data.vehicle_id {
        Some(_) => vehicle_label(&mut tx, current.customer_id, vehicle_id).await?,
        None => current.vehicle_name.clone(),
    };
    let technician_id = data.technician_id.unwrap_or(current.technician_id);
    check_technician(&mut tx, technician_id, scheduled_at, duration, Some(id)).await?;

    let notes = data.notes.as_deref().or(current.notes.as_deref());
    let service_type = data.service_type.as_deref().unwrap_or(&current.service_type);
    appointment::update(
        &mut tx,
        id,
        &AppointmentRow {
            customer_id: current.customer_id,
            customer_name: &current.customer_name,
            vehicle_id,
            vehicle_name: vehicle_name.as_deref(),
            technician_id,
            service_type,
            scheduled_at,
            duration_minutes: duration,
            notes,
        },
    )
    .await?;
    let updated = require(&mut tx, id).await?;
    db::commit(tx).await?;
    Ok(updated)
}

/// Confirm, complete, cancel or mark no-show; final statuses are frozen
pub async fn change_status(pool: &SqlitePool, id: i64, status: AppointmentStatus) -> AppResult<Appointment> {
    let mut tx = db::begin(pool).await?;
    let current = require(&mut tx, id).await?;
    if current.status.is_final() {
        return Err(closed(&current));
    }
    appointment::set_status(&mut *tx, id, status).await?;
    let updated = require(&mut tx, id).await?;
    db::commit(tx).await?;
    tracing::info!(appointment_id = id, status = ?status, "Appointment status changed");
    Ok(updated)
}

/// Turn the appointment into a new job and close it
pub async fn convert(pool: &SqlitePool, id: i64) -> AppResult<Job> {
    let mut tx = db::begin(pool).await?;
    let current = require(&mut tx, id).await?;
    if let Some(job_id) = current.job_id {
        return Err(AppError::new(ErrorCode::AppointmentAlreadyConverted).with_detail("job_id", job_id));
    }
    if current.status.is_final() {
        return Err(closed(&current));
    }
    let Some(vehicle_id) = current.vehicle_id else {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Appointment has no vehicle; set one before converting",
        ));
    };

    let job_id = jobs::insert_job(
        &mut tx,
        &JobCreate {
            customer_id: current.customer_id,
            vehicle_id,
            technician_id: current.technician_id,
            stage: None,
            service_items: vec![],
            discount: None,
            tax_rate: None,
            notes: current
                .notes
                .clone()
                .or_else(|| Some(current.service_type.clone())),
            estimated_completion: None,
            materials: vec![],
        },
    )
    .await?;
    appointment::link_job(&mut tx, id, job_id).await?;
    let created = job::load(&mut tx, job_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::JobNotFound))?;
    db::commit(tx).await?;

    tracing::info!(appointment_id = id, job_id, job_number = %created.job_number, "Appointment converted");
    Ok(created)
}

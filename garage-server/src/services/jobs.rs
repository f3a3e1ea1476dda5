//! Job lifecycle
//!
//! Every operation runs in one transaction: stock deductions, invoice
//! issuing and the notification outbox commit or roll back together with
//! the job change that caused them.

use shared::error::ErrorCode;
use shared::models::{
    Job, JobCreate, JobStage, JobUpdate, MaterialUsageInput, ServiceItemInput, TemplateEvent,
};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{customer, job, technician, vehicle};
use crate::db::repository::job::NewJob;
use crate::db::{self, next_sequence};
use crate::services::billing::{self, require_job};
use crate::services::{notify, stock};
use crate::utils::money::{self, MONEY_TOLERANCE};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

fn locked(job: &Job) -> AppError {
    AppError::with_message(
        ErrorCode::JobStageLocked,
        format!("Job {} is {} and can no longer change", job.job_number, job.stage),
    )
    .with_detail("stage", job.stage.as_str())
}

fn validate_items(items: &[ServiceItemInput]) -> AppResult<()> {
    for item in items {
        validate_required_text(&item.name, "service item name", MAX_NAME_LEN)?;
        validate_optional_text(&item.description, "service item description", MAX_NOTE_LEN)?;
    }
    Ok(())
}

/// Active technician by id, with the name to denormalize onto the job
async fn active_technician(conn: &mut SqliteConnection, id: i64) -> AppResult<String> {
    let tech = technician::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TechnicianNotFound).with_detail("technician_id", id))?;
    if !tech.is_active {
        return Err(AppError::with_message(
            ErrorCode::TechnicianInactive,
            format!("Technician {} is inactive", tech.name),
        ));
    }
    Ok(tech.name)
}

/// Insert a job with its service lines and initial materials on an open
/// transaction. Returns the new job id.
pub(crate) async fn insert_job(conn: &mut SqliteConnection, data: &JobCreate) -> AppResult<i64> {
    validate_items(&data.service_items)?;
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;

    let stage = data.stage.unwrap_or(JobStage::New);
    if stage.is_terminal() {
        return Err(AppError::validation(format!(
            "A job cannot be created as {stage}"
        )));
    }

    let cust = customer::find_by_id(&mut *conn, data.customer_id)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::CustomerNotFound).with_detail("customer_id", data.customer_id)
        })?;
    let veh = vehicle::find_by_id(&mut *conn, data.vehicle_id)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::VehicleNotFound).with_detail("vehicle_id", data.vehicle_id)
        })?;
    if veh.customer_id != cust.id {
        return Err(AppError::new(ErrorCode::VehicleNotOwned)
            .with_detail("vehicle_id", veh.id)
            .with_detail("customer_id", cust.id));
    }

    let technician_name = match data.technician_id {
        Some(id) => Some(active_technician(conn, id).await?),
        None => None,
    };

    let totals = money::calculate_totals(
        &data.service_items,
        data.discount.unwrap_or(0.0),
        data.tax_rate.unwrap_or(0.0),
    )?;

    let seq = next_sequence(conn, "job").await?;
    let job_number = shared::util::document_number("JOB", seq);
    let vehicle_name = veh.display_name();
    let job_id = job::insert(
        conn,
        &NewJob {
            job_number: &job_number,
            customer_id: cust.id,
            vehicle_id: veh.id,
            customer_name: &cust.name,
            customer_phone: &cust.phone,
            vehicle_name: &vehicle_name,
            stage,
            technician_id: data.technician_id,
            technician_name: technician_name.as_deref(),
            totals,
            notes: data.notes.as_deref(),
            estimated_completion: data.estimated_completion,
        },
    )
    .await?;
    job::replace_service_items(conn, job_id, &data.service_items).await?;

    for usage in &data.materials {
        stock::consume(conn, job_id, usage).await?;
    }

    tracing::info!(
        job_id,
        job_number = %job_number,
        customer_id = cust.id,
        total = totals.total,
        "Job created"
    );
    Ok(job_id)
}

async fn reload(conn: &mut SqliteConnection, id: i64) -> AppResult<Job> {
    job::load(conn, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::JobNotFound).with_detail("job_id", id))
}

pub async fn create(pool: &SqlitePool, data: &JobCreate) -> AppResult<Job> {
    let mut tx = db::begin(pool).await?;
    let id = insert_job(&mut tx, data).await?;
    let created = reload(&mut tx, id).await?;
    db::commit(tx).await?;
    Ok(created)
}

/// Edit notes, pricing or service lines of an open job
pub async fn update(pool: &SqlitePool, id: i64, data: &JobUpdate) -> AppResult<Job> {
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
    if let Some(items) = &data.service_items {
        validate_items(items)?;
    }

    let mut tx = db::begin(pool).await?;
    let current = require_job(&mut tx, id).await?;
    if current.stage.is_terminal() {
        return Err(locked(&current));
    }

    let items: Vec<ServiceItemInput> = match &data.service_items {
        Some(items) => items.clone(),
        None => job::service_items(&mut *tx, id)
            .await?
            .into_iter()
            .map(|i| ServiceItemInput {
                name: i.name,
                description: i.description,
                price: i.price,
                quantity: i.quantity,
            })
            .collect(),
    };
    let totals = money::calculate_totals(
        &items,
        data.discount.unwrap_or(current.discount),
        data.tax_rate.unwrap_or(current.tax_rate),
    )?;

    let paid = job::sum_payments(&mut *tx, id).await?;
    if money::to_decimal(totals.total) + MONEY_TOLERANCE < money::to_decimal(paid) {
        return Err(AppError::with_message(
            ErrorCode::JobTotalBelowPaid,
            format!(
                "New total {:.2} is below the {:.2} already paid",
                totals.total, paid
            ),
        ));
    }

    if let Some(items) = &data.service_items {
        job::replace_service_items(&mut tx, id, items).await?;
    }
    job::update_details(&mut tx, id, data.notes.as_deref(), data.estimated_completion).await?;
    billing::settle(&mut tx, id, &totals).await?;

    let updated = reload(&mut tx, id).await?;
    db::commit(tx).await?;
    Ok(updated)
}

/// Move a job through the funnel.
///
/// Completing a job stamps `completed_at`, issues its invoice and queues a
/// `job_completed` message for the customer.
pub async fn change_stage(pool: &SqlitePool, id: i64, stage: JobStage) -> AppResult<Job> {
    let mut tx = db::begin(pool).await?;
    let current = require_job(&mut tx, id).await?;
    if current.stage.is_terminal() {
        return Err(locked(&current));
    }
    if current.stage == stage {
        return Err(AppError::with_message(
            ErrorCode::JobStageUnchanged,
            format!("Job {} is already {stage}", current.job_number),
        ));
    }

    job::set_stage(&mut tx, id, stage).await?;

    let mut invoice = None;
    if stage == JobStage::Completed {
        invoice = Some(billing::issue_invoice(&mut tx, id).await?);
    }

    let updated = reload(&mut tx, id).await?;
    if stage == JobStage::Completed {
        let vars = notify::job_completed_vars(&updated, invoice.as_ref());
        notify::queue_for_job(&mut tx, TemplateEvent::JobCompleted, &updated, &vars).await;
    }
    db::commit(tx).await?;

    tracing::info!(
        job_id = id,
        from = current.stage.as_str(),
        to = stage.as_str(),
        "Job stage changed"
    );
    Ok(updated)
}

/// Assign (or with `None`, unassign) the technician
pub async fn assign_technician(pool: &SqlitePool, id: i64, technician_id: Option<i64>) -> AppResult<Job> {
    let mut tx = db::begin(pool).await?;
    let current = require_job(&mut tx, id).await?;
    if current.stage.is_terminal() {
        return Err(locked(&current));
    }
    let name = match technician_id {
        Some(tid) => Some(active_technician(&mut tx, tid).await?),
        None => None,
    };
    job::set_technician(&mut tx, id, technician_id, name.as_deref()).await?;
    let updated = reload(&mut tx, id).await?;
    db::commit(tx).await?;
    Ok(updated)
}

/// Record materials used by an open job, deducting them from stock
pub async fn add_materials(pool: &SqlitePool, id: i64, usages: &[MaterialUsageInput]) -> AppResult<Job> {
    if usages.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "at least one material is required",
        ));
    }
    let mut tx = db::begin(pool).await?;
    let current = require_job(&mut tx, id).await?;
    if current.stage.is_terminal() {
        return Err(locked(&current));
    }
    for usage in usages {
        stock::consume(&mut tx, id, usage).await?;
    }
    let updated = reload(&mut tx, id).await?;
    db::commit(tx).await?;
    Ok(updated)
}

/// Undo a material record and return it to stock
pub async fn remove_material(pool: &SqlitePool, id: i64, material_id: i64) -> AppResult<Job> {
    let mut tx = db::begin(pool).await?;
    let current = require_job(&mut tx, id).await?;
    if current.stage.is_terminal() {
        return Err(locked(&current));
    }
    let material = job::find_material(&mut *tx, id, material_id)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::MaterialNotFound).with_detail("material_id", material_id)
        })?;
    stock::restore(&mut tx, &material).await?;
    job::delete_material(&mut tx, material_id).await?;
    let updated = reload(&mut tx, id).await?;
    db::commit(tx).await?;
    Ok(updated)
}

/// Delete a job that was never invoiced, returning its materials to stock
pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let mut tx = db::begin(pool).await?;
    let current = require_job(&mut tx, id).await?;
    if current.invoice_id.is_some()
        || crate::db::repository::invoice::find_row_by_job(&mut *tx, id)
            .await?
            .is_some()
    {
        return Err(AppError::with_message(
            ErrorCode::JobHasInvoice,
            format!("Job {} has been invoiced", current.job_number),
        ));
    }
    for material in job::materials(&mut *tx, id).await? {
        stock::restore(&mut tx, &material).await?;
    }
    job::delete(&mut tx, id).await?;
    db::commit(tx).await?;
    tracing::info!(job_id = id, job_number = %current.job_number, "Job deleted");
    Ok(())
}

//! Invoicing and payment settlement
//!
//! Payments belong to the job. Every payment change recomputes the job's
//! `paid_amount / balance / payment_status` and mirrors them onto the job's
//! invoice inside the same transaction.

use shared::error::ErrorCode;
use shared::models::{Invoice, Job, JobStage, PaymentInput, TemplateEvent};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{RepoError, invoice, job};
use crate::db::{self, next_sequence};
use crate::services::notify;
use crate::utils::money::{self, JobTotals};
use crate::utils::{AppError, AppResult};

pub(crate) async fn require_job(conn: &mut SqliteConnection, job_id: i64) -> AppResult<Job> {
    job::find_row(&mut *conn, job_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::JobNotFound).with_detail("job_id", job_id))
}

fn totals_of(job: &Job) -> JobTotals {
    JobTotals {
        subtotal: job.subtotal,
        discount: job.discount,
        tax_rate: job.tax_rate,
        tax_amount: job.tax_amount,
        total: job.total,
    }
}

/// Recompute settlement from the job's payments and push it to the invoice
pub(crate) async fn settle(conn: &mut SqliteConnection, job_id: i64, totals: &JobTotals) -> AppResult<()> {
    let paid = money::to_f64(money::to_decimal(job::sum_payments(&mut *conn, job_id).await?));
    let balance = money::balance(totals.total, paid);
    let status = money::payment_status(totals.total, paid);
    job::save_financials(conn, job_id, totals, paid, balance, status).await?;

    if let Some(inv) = invoice::find_row_by_job(&mut *conn, job_id).await? {
        invoice::sync_payment(conn, inv.id, paid, balance, status).await?;
    }
    Ok(())
}

/// Create the invoice for a completed job inside an open transaction
pub(crate) async fn issue_invoice(conn: &mut SqliteConnection, job_id: i64) -> AppResult<Invoice> {
    let job = job::load(&mut *conn, job_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::JobNotFound).with_detail("job_id", job_id))?;
    if job.stage != JobStage::Completed {
        return Err(AppError::with_message(
            ErrorCode::JobNotCompleted,
            format!("Job {} is {}, invoices are issued on completion", job.job_number, job.stage),
        ));
    }
    if invoice::find_row_by_job(&mut *conn, job_id).await?.is_some() {
        return Err(AppError::new(ErrorCode::InvoiceAlreadyExists).with_detail("job_id", job_id));
    }

    let seq = next_sequence(conn, "invoice").await?;
    let number = shared::util::document_number("INV", seq);
    let invoice_id = invoice::insert_from_job(conn, &number, &job)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => {
                AppError::new(ErrorCode::InvoiceAlreadyExists).with_detail("job_id", job_id)
            }
            other => other.into(),
        })?;
    job::set_invoice(conn, job_id, invoice_id).await?;

    tracing::info!(
        job_id,
        invoice_id,
        invoice_number = %number,
        total = job.total,
        "Invoice issued"
    );

    invoice::load(conn, invoice_id)
        .await?
        .ok_or_else(|| AppError::internal("Invoice vanished after insert"))
}

/// POST /api/jobs/{id}/invoice
pub async fn generate_invoice(pool: &SqlitePool, job_id: i64) -> AppResult<Invoice> {
    let mut tx = db::begin(pool).await?;
    let invoice = issue_invoice(&mut tx, job_id).await?;
    db::commit(tx).await?;
    Ok(invoice)
}

/// Record a payment against a job, capped at the outstanding balance
pub async fn add_payment(pool: &SqlitePool, job_id: i64, payment: &PaymentInput) -> AppResult<Job> {
    money::validate_payment_amount(payment.amount)?;
    crate::utils::validation::validate_optional_text(
        &payment.reference,
        "reference",
        crate::utils::validation::MAX_SHORT_TEXT_LEN,
    )?;
    crate::utils::validation::validate_optional_text(
        &payment.note,
        "note",
        crate::utils::validation::MAX_NOTE_LEN,
    )?;

    let mut tx = db::begin(pool).await?;
    let job = require_job(&mut tx, job_id).await?;
    if job.stage == JobStage::Cancelled {
        return Err(AppError::new(ErrorCode::PaymentOnCancelledJob).with_detail("job_id", job_id));
    }

    let paid = job::sum_payments(&mut *tx, job_id).await?;
    let outstanding = money::balance(job.total, paid);
    if !money::fits_balance(payment.amount, outstanding) {
        return Err(AppError::with_message(
            ErrorCode::PaymentExceedsBalance,
            format!(
                "Payment {:.2} exceeds the outstanding balance {:.2}",
                payment.amount, outstanding
            ),
        )
        .with_detail("amount", payment.amount)
        .with_detail("balance", outstanding));
    }

    let payment_id = job::insert_payment(&mut tx, job_id, payment).await?;
    settle(&mut tx, job_id, &totals_of(&job)).await?;

    let updated = job::load(&mut tx, job_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::JobNotFound))?;
    tracing::info!(
        job_id,
        payment_id,
        amount = payment.amount,
        balance = updated.balance,
        "Payment recorded"
    );
    let vars = notify::payment_received_vars(&updated, payment.amount);
    notify::queue_for_job(&mut tx, TemplateEvent::PaymentReceived, &updated, &vars).await;

    db::commit(tx).await?;
    Ok(updated)
}

/// Delete a payment and re-settle the job and invoice
pub async fn remove_payment(pool: &SqlitePool, job_id: i64, payment_id: i64) -> AppResult<Job> {
    let mut tx = db::begin(pool).await?;
    let job = require_job(&mut tx, job_id).await?;
    if !job::delete_payment(&mut tx, job_id, payment_id).await? {
        return Err(AppError::new(ErrorCode::PaymentNotFound).with_detail("payment_id", payment_id));
    }
    settle(&mut tx, job_id, &totals_of(&job)).await?;
    let updated = job::load(&mut tx, job_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::JobNotFound))?;
    db::commit(tx).await?;
    tracing::info!(job_id, payment_id, balance = updated.balance, "Payment removed");
    Ok(updated)
}

/// POST /api/invoices/{id}/payments: pay the invoice's job
pub async fn pay_invoice(pool: &SqlitePool, invoice_id: i64, payment: &PaymentInput) -> AppResult<Invoice> {
    let inv = invoice::find_row(pool, invoice_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound).with_detail("invoice_id", invoice_id))?;
    add_payment(pool, inv.job_id, payment).await?;
    invoice::find_detail(pool, invoice_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound))
}

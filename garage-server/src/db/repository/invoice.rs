//! Invoice Repository

use super::RepoResult;
use shared::models::{Invoice, InvoiceItem, Job, PaymentStatus};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const INVOICE_SELECT: &str = "SELECT id, invoice_number, job_id, customer_id, customer_name, customer_phone, vehicle_name, subtotal, discount, tax_rate, tax_amount, total, paid_amount, balance, status, issued_at, notes, created_at, updated_at FROM invoice";

/// List invoices (newest first), optionally by settlement status
pub async fn find_all(pool: &SqlitePool, status: Option<PaymentStatus>) -> RepoResult<Vec<Invoice>> {
    let sql = format!("{INVOICE_SELECT} WHERE (?1 IS NULL OR status = ?1) ORDER BY issued_at DESC");
    let rows = sqlx::query_as::<_, Invoice>(&sql)
        .bind(status)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_row<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Invoice>> {
    let sql = format!("{INVOICE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Invoice>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn find_row_by_job<'e>(ex: impl SqliteExecutor<'e>, job_id: i64) -> RepoResult<Option<Invoice>> {
    let sql = format!("{INVOICE_SELECT} WHERE job_id = ?");
    let row = sqlx::query_as::<_, Invoice>(&sql)
        .bind(job_id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

/// Invoice with line items
pub async fn load(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Invoice>> {
    let Some(mut invoice) = find_row(&mut *conn, id).await? else {
        return Ok(None);
    };
    invoice.items = items(&mut *conn, id).await?;
    Ok(Some(invoice))
}

pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<Invoice>> {
    let mut conn = pool.acquire().await?;
    load(&mut conn, id).await
}

pub async fn find_detail_by_job(pool: &SqlitePool, job_id: i64) -> RepoResult<Option<Invoice>> {
    let mut conn = pool.acquire().await?;
    let Some(row) = find_row_by_job(&mut *conn, job_id).await? else {
        return Ok(None);
    };
    load(&mut conn, row.id).await
}

pub async fn items<'e>(ex: impl SqliteExecutor<'e>, invoice_id: i64) -> RepoResult<Vec<InvoiceItem>> {
    let rows = sqlx::query_as::<_, InvoiceItem>(
        "SELECT id, invoice_id, name, description, price, quantity, amount FROM invoice_item WHERE invoice_id = ? ORDER BY position, id",
    )
    .bind(invoice_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

/// Snapshot a loaded job into a new invoice. The UNIQUE job_id constraint
/// rejects a second invoice for the same job with `RepoError::Duplicate`.
pub async fn insert_from_job(
    conn: &mut SqliteConnection,
    invoice_number: &str,
    job: &Job,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO invoice (id, invoice_number, job_id, customer_id, customer_name, customer_phone, vehicle_name, subtotal, discount, tax_rate, tax_amount, total, paid_amount, balance, status, issued_at, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?16, ?16)",
    )
    .bind(id)
    .bind(invoice_number)
    .bind(job.id)
    .bind(job.customer_id)
    .bind(&job.customer_name)
    .bind(&job.customer_phone)
    .bind(&job.vehicle_name)
    .bind(job.subtotal)
    .bind(job.discount)
    .bind(job.tax_rate)
    .bind(job.tax_amount)
    .bind(job.total)
    .bind(job.paid_amount)
    .bind(job.balance)
    .bind(job.payment_status)
    .bind(now)
    .bind(&job.notes)
    .execute(&mut *conn)
    .await?;

    for (position, item) in (0_i64..).zip(&job.service_items) {
        let amount = crate::utils::money::to_f64(
            crate::utils::money::to_decimal(item.price) * rust_decimal::Decimal::from(item.quantity),
        );
        sqlx::query(
            "INSERT INTO invoice_item (id, invoice_id, name, description, price, quantity, amount, position) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(shared::util::snowflake_id())
        .bind(id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.quantity)
        .bind(amount)
        .bind(position)
        .execute(&mut *conn)
        .await?;
    }
    Ok(id)
}

/// Mirror the job's settlement onto its invoice
pub async fn sync_payment(
    conn: &mut SqliteConnection,
    invoice_id: i64,
    paid_amount: f64,
    balance: f64,
    status: PaymentStatus,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE invoice SET paid_amount = ?1, balance = ?2, status = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(paid_amount)
    .bind(balance)
    .bind(status)
    .bind(now)
    .bind(invoice_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

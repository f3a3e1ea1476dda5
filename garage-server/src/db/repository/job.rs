//! Job Repository
//!
//! Row-level access to jobs and their child tables. Business rules (stage
//! transitions, payment capping, stock deduction) live in `services::jobs`.

use super::{RepoError, RepoResult};
use shared::models::{
    Job, JobMaterial, JobPayment, JobStage, MaterialUnit, PaymentInput, PaymentStatus,
    ServiceItem, ServiceItemInput, StageCount,
};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

use crate::utils::money::JobTotals;

const JOB_SELECT: &str = "SELECT id, job_number, customer_id, vehicle_id, customer_name, customer_phone, vehicle_name, stage, technician_id, technician_name, subtotal, discount, tax_rate, tax_amount, total, paid_amount, balance, payment_status, notes, estimated_completion, started_at, completed_at, cancelled_at, invoice_id, created_at, updated_at FROM job";

const MATERIAL_SELECT: &str = "SELECT id, job_id, inventory_item_id, roll_id, item_name, quantity, unit, meters_used, sqft_used, cost, used_at FROM job_material";

/// Filters for [`find_all`]
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct JobFilter {
    pub stage: Option<JobStage>,
    pub customer_id: Option<i64>,
    pub technician_id: Option<i64>,
}

/// List job rows (newest first) without child records
pub async fn find_all(pool: &SqlitePool, filter: &JobFilter) -> RepoResult<Vec<Job>> {
    let sql = format!(
        "{JOB_SELECT} WHERE (?1 IS NULL OR stage = ?1) AND (?2 IS NULL OR customer_id = ?2) AND (?3 IS NULL OR technician_id = ?3) ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, Job>(&sql)
        .bind(filter.stage)
        .bind(filter.customer_id)
        .bind(filter.technician_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Job row without child records
pub async fn find_row<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Job>> {
    let sql = format!("{JOB_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Job>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

/// Job with service items, payments and materials
pub async fn load(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Job>> {
    let Some(mut job) = find_row(&mut *conn, id).await? else {
        return Ok(None);
    };
    job.service_items = service_items(&mut *conn, id).await?;
    job.payments = payments(&mut *conn, id).await?;
    job.materials = materials(&mut *conn, id).await?;
    Ok(Some(job))
}

pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<Job>> {
    let mut conn = pool.acquire().await?;
    load(&mut conn, id).await
}

/// Fields of a new job row
pub struct NewJob<'a> {
    pub job_number: &'a str,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub vehicle_name: &'a str,
    pub stage: JobStage,
    pub technician_id: Option<i64>,
    pub technician_name: Option<&'a str>,
    pub totals: JobTotals,
    pub notes: Option<&'a str>,
    pub estimated_completion: Option<i64>,
}

pub async fn insert(conn: &mut SqliteConnection, job: &NewJob<'_>) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let started_at = (job.stage == JobStage::InProgress).then_some(now);
    sqlx::query(
        "INSERT INTO job (id, job_number, customer_id, vehicle_id, customer_name, customer_phone, vehicle_name, stage, technician_id, technician_name, subtotal, discount, tax_rate, tax_amount, total, paid_amount, balance, payment_status, notes, estimated_completion, started_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, 0, ?15, ?16, ?17, ?18, ?19, ?20, ?20)",
    )
    .bind(id)
    .bind(job.job_number)
    .bind(job.customer_id)
    .bind(job.vehicle_id)
    .bind(job.customer_name)
    .bind(job.customer_phone)
    .bind(job.vehicle_name)
    .bind(job.stage)
    .bind(job.technician_id)
    .bind(job.technician_name)
    .bind(job.totals.subtotal)
    .bind(job.totals.discount)
    .bind(job.totals.tax_rate)
    .bind(job.totals.tax_amount)
    .bind(job.totals.total)
    .bind(PaymentStatus::Unpaid)
    .bind(job.notes)
    .bind(job.estimated_completion)
    .bind(started_at)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn update_details(
    conn: &mut SqliteConnection,
    id: i64,
    notes: Option<&str>,
    estimated_completion: Option<i64>,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE job SET notes = COALESCE(?1, notes), estimated_completion = COALESCE(?2, estimated_completion), updated_at = ?3 WHERE id = ?4",
    )
    .bind(notes)
    .bind(estimated_completion)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Job {id} not found")));
    }
    Ok(())
}

/// Persist recomputed money fields
pub async fn save_financials(
    conn: &mut SqliteConnection,
    id: i64,
    totals: &JobTotals,
    paid_amount: f64,
    balance: f64,
    status: PaymentStatus,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE job SET subtotal = ?1, discount = ?2, tax_rate = ?3, tax_amount = ?4, total = ?5, paid_amount = ?6, balance = ?7, payment_status = ?8, updated_at = ?9 WHERE id = ?10",
    )
    .bind(totals.subtotal)
    .bind(totals.discount)
    .bind(totals.tax_rate)
    .bind(totals.tax_amount)
    .bind(totals.total)
    .bind(paid_amount)
    .bind(balance)
    .bind(status)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Move to `stage`, stamping the matching lifecycle timestamp
pub async fn set_stage(conn: &mut SqliteConnection, id: i64, stage: JobStage) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let started = (stage == JobStage::InProgress).then_some(now);
    let completed = (stage == JobStage::Completed).then_some(now);
    let cancelled = (stage == JobStage::Cancelled).then_some(now);
    sqlx::query(
        "UPDATE job SET stage = ?1, started_at = COALESCE(started_at, ?2), completed_at = COALESCE(?3, completed_at), cancelled_at = COALESCE(?4, cancelled_at), updated_at = ?5 WHERE id = ?6",
    )
    .bind(stage)
    .bind(started)
    .bind(completed)
    .bind(cancelled)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn set_technician(
    conn: &mut SqliteConnection,
    id: i64,
    technician_id: Option<i64>,
    technician_name: Option<&str>,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE job SET technician_id = ?1, technician_name = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(technician_id)
        .bind(technician_name)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn set_invoice(conn: &mut SqliteConnection, id: i64, invoice_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE job SET invoice_id = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(invoice_id)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Remove the job row; child rows cascade
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM job WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn count_for_customer<'e>(ex: impl SqliteExecutor<'e>, customer_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job WHERE customer_id = ?")
        .bind(customer_id)
        .fetch_one(ex)
        .await?;
    Ok(count)
}

pub async fn count_for_vehicle<'e>(ex: impl SqliteExecutor<'e>, vehicle_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job WHERE vehicle_id = ?")
        .bind(vehicle_id)
        .fetch_one(ex)
        .await?;
    Ok(count)
}

/// Job count per stage, every stage present
pub async fn stage_counts<'e>(ex: impl SqliteExecutor<'e>) -> RepoResult<Vec<StageCount>> {
    let rows = sqlx::query_as::<_, StageCount>(
        "SELECT stage, COUNT(*) AS count FROM job GROUP BY stage",
    )
    .fetch_all(ex)
    .await?;
    Ok(JobStage::ALL
        .iter()
        .map(|stage| StageCount {
            stage: *stage,
            count: rows
                .iter()
                .find(|r| r.stage == *stage)
                .map(|r| r.count)
                .unwrap_or(0),
        })
        .collect())
}

// ── Service items ───────────────────────────────────────────────────

pub async fn service_items<'e>(ex: impl SqliteExecutor<'e>, job_id: i64) -> RepoResult<Vec<ServiceItem>> {
    let rows = sqlx::query_as::<_, ServiceItem>(
        "SELECT id, job_id, name, description, price, quantity FROM job_service_item WHERE job_id = ? ORDER BY position, id",
    )
    .bind(job_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn replace_service_items(
    conn: &mut SqliteConnection,
    job_id: i64,
    items: &[ServiceItemInput],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM job_service_item WHERE job_id = ?")
        .bind(job_id)
        .execute(&mut *conn)
        .await?;
    for (position, item) in (0_i64..).zip(items) {
        sqlx::query(
            "INSERT INTO job_service_item (id, job_id, name, description, price, quantity, position) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(shared::util::snowflake_id())
        .bind(job_id)
        .bind(item.name.trim())
        .bind(&item.description)
        .bind(item.price)
        .bind(item.quantity)
        .bind(position)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

// ── Payments ────────────────────────────────────────────────────────

pub async fn payments<'e>(ex: impl SqliteExecutor<'e>, job_id: i64) -> RepoResult<Vec<JobPayment>> {
    let rows = sqlx::query_as::<_, JobPayment>(
        "SELECT id, job_id, amount, method, reference, note, paid_at FROM job_payment WHERE job_id = ? ORDER BY paid_at, id",
    )
    .bind(job_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

pub async fn insert_payment(
    conn: &mut SqliteConnection,
    job_id: i64,
    payment: &PaymentInput,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let paid_at = payment.paid_at.unwrap_or_else(shared::util::now_millis);
    sqlx::query(
        "INSERT INTO job_payment (id, job_id, amount, method, reference, note, paid_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(id)
    .bind(job_id)
    .bind(payment.amount)
    .bind(payment.method)
    .bind(&payment.reference)
    .bind(&payment.note)
    .bind(paid_at)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn delete_payment(conn: &mut SqliteConnection, job_id: i64, payment_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM job_payment WHERE id = ? AND job_id = ?")
        .bind(payment_id)
        .bind(job_id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn sum_payments<'e>(ex: impl SqliteExecutor<'e>, job_id: i64) -> RepoResult<f64> {
    let sum = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(amount), 0.0) FROM job_payment WHERE job_id = ?",
    )
    .bind(job_id)
    .fetch_one(ex)
    .await?;
    Ok(sum)
}

// ── Materials ───────────────────────────────────────────────────────

pub async fn materials<'e>(ex: impl SqliteExecutor<'e>, job_id: i64) -> RepoResult<Vec<JobMaterial>> {
    let sql = format!("{MATERIAL_SELECT} WHERE job_id = ? ORDER BY used_at, id");
    let rows = sqlx::query_as::<_, JobMaterial>(&sql)
        .bind(job_id)
        .fetch_all(ex)
        .await?;
    Ok(rows)
}

pub async fn find_material<'e>(
    ex: impl SqliteExecutor<'e>,
    job_id: i64,
    material_id: i64,
) -> RepoResult<Option<JobMaterial>> {
    let sql = format!("{MATERIAL_SELECT} WHERE id = ? AND job_id = ?");
    let row = sqlx::query_as::<_, JobMaterial>(&sql)
        .bind(material_id)
        .bind(job_id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

/// Fields of a consumed-material row
pub struct NewMaterial<'a> {
    pub job_id: i64,
    pub inventory_item_id: i64,
    pub roll_id: Option<i64>,
    pub item_name: &'a str,
    pub quantity: f64,
    pub unit: MaterialUnit,
    pub meters_used: f64,
    pub sqft_used: f64,
    pub cost: f64,
}

pub async fn insert_material(conn: &mut SqliteConnection, m: &NewMaterial<'_>) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO job_material (id, job_id, inventory_item_id, roll_id, item_name, quantity, unit, meters_used, sqft_used, cost, used_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(id)
    .bind(m.job_id)
    .bind(m.inventory_item_id)
    .bind(m.roll_id)
    .bind(m.item_name)
    .bind(m.quantity)
    .bind(m.unit)
    .bind(m.meters_used)
    .bind(m.sqft_used)
    .bind(m.cost)
    .bind(shared::util::now_millis())
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn delete_material(conn: &mut SqliteConnection, material_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM job_material WHERE id = ?")
        .bind(material_id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

//! Appointment Repository

use super::{RepoError, RepoResult};
use shared::models::{Appointment, AppointmentStatus};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const APPOINTMENT_SELECT: &str = "SELECT id, customer_id, customer_name, vehicle_id, vehicle_name, technician_id, service_type, scheduled_at, duration_minutes, status, job_id, notes, created_at, updated_at FROM appointment";

/// Filters for [`find_all`]; `from`/`to` bound `scheduled_at` (Unix millis)
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct AppointmentFilter {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub status: Option<AppointmentStatus>,
}

pub async fn find_all(pool: &SqlitePool, filter: &AppointmentFilter) -> RepoResult<Vec<Appointment>> {
    let sql = format!(
        "{APPOINTMENT_SELECT} WHERE (?1 IS NULL OR scheduled_at >= ?1) AND (?2 IS NULL OR scheduled_at < ?2) AND (?3 IS NULL OR status = ?3) ORDER BY scheduled_at"
    );
    let rows = sqlx::query_as::<_, Appointment>(&sql)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.status)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Appointment>> {
    let sql = format!("{APPOINTMENT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Appointment>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

/// Fields of an appointment row, with names already resolved
pub struct AppointmentRow<'a> {
    pub customer_id: i64,
    pub customer_name: &'a str,
    pub vehicle_id: Option<i64>,
    pub vehicle_name: Option<&'a str>,
    pub technician_id: Option<i64>,
    pub service_type: &'a str,
    pub scheduled_at: i64,
    pub duration_minutes: i32,
    pub notes: Option<&'a str>,
}

pub async fn insert(conn: &mut SqliteConnection, row: &AppointmentRow<'_>) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO appointment (id, customer_id, customer_name, vehicle_id, vehicle_name, technician_id, service_type, scheduled_at, duration_minutes, status, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(row.customer_id)
    .bind(row.customer_name)
    .bind(row.vehicle_id)
    .bind(row.vehicle_name)
    .bind(row.technician_id)
    .bind(row.service_type.trim())
    .bind(row.scheduled_at)
    .bind(row.duration_minutes)
    .bind(AppointmentStatus::Scheduled)
    .bind(row.notes)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

/// Overwrite the schedulable fields of an appointment
pub async fn update(conn: &mut SqliteConnection, id: i64, row: &AppointmentRow<'_>) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE appointment SET vehicle_id = ?1, vehicle_name = ?2, technician_id = ?3, service_type = ?4, scheduled_at = ?5, duration_minutes = ?6, notes = ?7, updated_at = ?8 WHERE id = ?9",
    )
    .bind(row.vehicle_id)
    .bind(row.vehicle_name)
    .bind(row.technician_id)
    .bind(row.service_type.trim())
    .bind(row.scheduled_at)
    .bind(row.duration_minutes)
    .bind(row.notes)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Appointment {id} not found")));
    }
    Ok(())
}

pub async fn set_status<'e>(
    ex: impl SqliteExecutor<'e>,
    id: i64,
    status: AppointmentStatus,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE appointment SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Mark converted: completed and linked to the new job
pub async fn link_job(conn: &mut SqliteConnection, id: i64, job_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE appointment SET status = ?1, job_id = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(AppointmentStatus::Completed)
        .bind(job_id)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM appointment WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Whether the technician already holds an active appointment overlapping
/// `[start, end)`, ignoring `exclude_id`
pub async fn has_overlap<'e>(
    ex: impl SqliteExecutor<'e>,
    technician_id: i64,
    start: i64,
    end: i64,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM appointment WHERE technician_id = ?1 AND status IN ('scheduled', 'confirmed') AND scheduled_at < ?3 AND scheduled_at + duration_minutes * 60000 > ?2 AND (?4 IS NULL OR id != ?4)",
    )
    .bind(technician_id)
    .bind(start)
    .bind(end)
    .bind(exclude_id)
    .fetch_one(ex)
    .await?;
    Ok(count > 0)
}

/// Active appointments starting in `[from, to)`
pub async fn count_upcoming<'e>(ex: impl SqliteExecutor<'e>, from: i64, to: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM appointment WHERE status IN ('scheduled', 'confirmed') AND scheduled_at >= ?1 AND scheduled_at < ?2",
    )
    .bind(from)
    .bind(to)
    .fetch_one(ex)
    .await?;
    Ok(count)
}

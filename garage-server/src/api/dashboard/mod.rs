//! Dashboard API

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Datelike, Duration, Utc};
use shared::models::DashboardSummary;

use crate::core::ServerState;
use crate::db::repository::{appointment, dashboard, inventory, job};
use crate::utils::AppResult;

const UPCOMING_WINDOW_DAYS: i64 = 7;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/dashboard/summary", get(summary))
}

/// First instant of the current month (UTC), in millis
fn month_start(now: DateTime<Utc>) -> i64 {
    now.date_naive()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// GET /api/dashboard/summary
async fn summary(State(state): State<ServerState>) -> AppResult<Json<DashboardSummary>> {
    let pool = &state.pool;
    let now = Utc::now();
    let now_ms = now.timestamp_millis();
    let window_end = (now + Duration::days(UPCOMING_WINDOW_DAYS)).timestamp_millis();

    Ok(Json(DashboardSummary {
        jobs_by_stage: job::stage_counts(pool).await?,
        active_jobs: dashboard::count_active_jobs(pool).await?,
        completed_this_month: dashboard::count_completed_since(pool, month_start(now)).await?,
        revenue_collected: dashboard::revenue_collected(pool).await?,
        outstanding_balance: dashboard::outstanding_balance(pool).await?,
        low_stock_items: inventory::count_low_stock(pool).await?,
        upcoming_appointments: appointment::count_upcoming(pool, now_ms, window_end).await?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http::testing::{send, test_router};
    use chrono::TimeZone;
    use http::StatusCode;

    #[test]
    fn month_start_is_first_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 17, 15, 4, 5).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(month_start(now), start.timestamp_millis());
    }

    #[tokio::test]
    async fn empty_summary_lists_every_stage() {
        let router = test_router().await;
        let (status, body) = send(&router, "GET", "/api/dashboard/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobs_by_stage"].as_array().unwrap().len(), 6);
        assert_eq!(body["active_jobs"], 0);
        assert_eq!(body["upcoming_appointments"], 0);
    }
}

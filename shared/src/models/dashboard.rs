//! Dashboard Summary

use serde::{Deserialize, Serialize};

use super::job::StageCount;

/// Back-office overview numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub jobs_by_stage: Vec<StageCount>,
    /// Jobs not yet completed or cancelled
    pub active_jobs: i64,
    pub completed_this_month: i64,
    /// Sum of all recorded payments
    pub revenue_collected: f64,
    /// Sum of balances on non-cancelled jobs
    pub outstanding_balance: f64,
    pub low_stock_items: i64,
    /// Active appointments in the next 7 days
    pub upcoming_appointments: i64,
}

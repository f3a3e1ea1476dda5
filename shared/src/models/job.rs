//! Job Models (service funnel)

use serde::{Deserialize, Serialize};

/// Funnel stage of a job
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum JobStage {
    New,
    Inspection,
    InProgress,
    QualityCheck,
    Completed,
    Cancelled,
}

impl JobStage {
    /// All stages in funnel order
    pub const ALL: [JobStage; 6] = [
        JobStage::New,
        JobStage::Inspection,
        JobStage::InProgress,
        JobStage::QualityCheck,
        JobStage::Completed,
        JobStage::Cancelled,
    ];

    /// Completed and cancelled jobs never move again
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Completed | JobStage::Cancelled)
    }

    /// Any open stage may move to any other stage; closed stages are frozen.
    pub fn can_transition_to(&self, next: JobStage) -> bool {
        !self.is_terminal() && *self != next
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::New => "new",
            JobStage::Inspection => "inspection",
            JobStage::InProgress => "in_progress",
            JobStage::QualityCheck => "quality_check",
            JobStage::Completed => "completed",
            JobStage::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement state of a job or invoice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Other,
}

/// Unit a material usage is expressed in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum MaterialUnit {
    Meters,
    Sqft,
    Units,
}

/// Job entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Job {
    pub id: i64,
    /// Human-facing number, e.g. `JOB-00042`
    pub job_number: String,
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub vehicle_name: String,
    pub stage: JobStage,
    pub technician_id: Option<i64>,
    pub technician_name: Option<String>,
    pub subtotal: f64,
    pub discount: f64,
    /// Percent, e.g. 18.0
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub paid_amount: f64,
    pub balance: f64,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub estimated_completion: Option<i64>,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub cancelled_at: Option<i64>,
    pub invoice_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub service_items: Vec<ServiceItem>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub payments: Vec<JobPayment>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub materials: Vec<JobMaterial>,
}

/// Billable service line on a job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ServiceItem {
    pub id: i64,
    pub job_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceItemInput {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// Payment received against a job
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct JobPayment {
    pub id: i64,
    pub job_id: i64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub paid_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub amount: f64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub paid_at: Option<i64>,
}

/// Material consumed by a job, deducted from inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct JobMaterial {
    pub id: i64,
    pub job_id: i64,
    pub inventory_item_id: i64,
    pub roll_id: Option<i64>,
    pub item_name: String,
    /// Amount as requested, in `unit`
    pub quantity: f64,
    pub unit: MaterialUnit,
    /// Length taken from the roll (0 for non-roll items)
    pub meters_used: f64,
    /// Area taken from the roll (0 for non-roll items)
    pub sqft_used: f64,
    pub cost: f64,
    pub used_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialUsageInput {
    pub inventory_item_id: i64,
    /// Cut from this roll; when absent rolls are drawn oldest first
    pub roll_id: Option<i64>,
    pub quantity: f64,
    pub unit: MaterialUnit,
}

/// Create job payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreate {
    pub customer_id: i64,
    pub vehicle_id: i64,
    pub technician_id: Option<i64>,
    pub stage: Option<JobStage>,
    #[serde(default)]
    pub service_items: Vec<ServiceItemInput>,
    pub discount: Option<f64>,
    pub tax_rate: Option<f64>,
    pub notes: Option<String>,
    pub estimated_completion: Option<i64>,
    #[serde(default)]
    pub materials: Vec<MaterialUsageInput>,
}

/// Update job payload; `service_items` replaces the whole list when present
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobUpdate {
    pub notes: Option<String>,
    pub estimated_completion: Option<i64>,
    pub discount: Option<f64>,
    pub tax_rate: Option<f64>,
    pub service_items: Option<Vec<ServiceItemInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageChange {
    pub stage: JobStage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianAssignment {
    /// `None` unassigns
    pub technician_id: Option<i64>,
}

/// Job count per funnel stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StageCount {
    pub stage: JobStage,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_stages_are_frozen() {
        for next in JobStage::ALL {
            assert!(!JobStage::Completed.can_transition_to(next));
            assert!(!JobStage::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn open_stages_move_anywhere_else() {
        assert!(JobStage::New.can_transition_to(JobStage::InProgress));
        assert!(JobStage::QualityCheck.can_transition_to(JobStage::InProgress));
        assert!(JobStage::Inspection.can_transition_to(JobStage::Completed));
        assert!(JobStage::New.can_transition_to(JobStage::Cancelled));
        assert!(!JobStage::New.can_transition_to(JobStage::New));
    }

    #[test]
    fn stage_serializes_snake_case() {
        let json = serde_json::to_string(&JobStage::QualityCheck).unwrap();
        assert_eq!(json, "\"quality_check\"");
        assert_eq!(JobStage::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn service_item_quantity_defaults_to_one() {
        let item: ServiceItemInput =
            serde_json::from_str(r#"{"name":"Full body PPF","price":85000}"#).unwrap();
        assert_eq!(item.quantity, 1);
    }
}

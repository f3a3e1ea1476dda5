//! Notification Outbox Model

use serde::{Deserialize, Serialize};

use super::template::TemplateEvent;

/// A message the service would have sent; delivery is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    /// Always `whatsapp` today
    pub channel: String,
    pub event: TemplateEvent,
    pub recipient: String,
    pub message: String,
    pub job_id: Option<i64>,
    /// `queued`
    pub status: String,
    pub created_at: i64,
}

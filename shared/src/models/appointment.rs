//! Appointment Models

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Scheduled and confirmed appointments occupy the technician's calendar
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }

    pub fn is_final(&self) -> bool {
        !self.is_active()
    }
}

/// Appointment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Appointment {
    pub id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub vehicle_id: Option<i64>,
    pub vehicle_name: Option<String>,
    pub technician_id: Option<i64>,
    pub service_type: String,
    /// Start time (Unix millis)
    pub scheduled_at: i64,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    /// Job created by conversion
    pub job_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Appointment {
    pub fn ends_at(&self) -> i64 {
        self.scheduled_at + i64::from(self.duration_minutes) * 60_000
    }
}

/// Create appointment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentCreate {
    pub customer_id: i64,
    pub vehicle_id: Option<i64>,
    pub technician_id: Option<i64>,
    pub service_type: String,
    pub scheduled_at: i64,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

/// Update appointment payload (reschedule / reassign)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentUpdate {
    pub vehicle_id: Option<i64>,
    /// Absent keeps the technician, `null` unassigns
    #[serde(default, deserialize_with = "nullable")]
    pub technician_id: Option<Option<i64>>,
    pub service_type: Option<String>,
    pub scheduled_at: Option<i64>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

/// Present-but-null becomes `Some(None)`; `#[serde(default)]` covers absence
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentStatusChange {
    pub status: AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_scheduled_and_confirmed_are_active() {
        assert!(AppointmentStatus::Scheduled.is_active());
        assert!(AppointmentStatus::Confirmed.is_active());
        assert!(AppointmentStatus::NoShow.is_final());
        assert!(AppointmentStatus::Completed.is_final());
    }

    #[test]
    fn update_tells_null_technician_from_absent() {
        let keep: AppointmentUpdate = serde_json::from_str(r#"{"notes":"x"}"#).unwrap();
        assert_eq!(keep.technician_id, None);
        let clear: AppointmentUpdate = serde_json::from_str(r#"{"technician_id":null}"#).unwrap();
        assert_eq!(clear.technician_id, Some(None));
        let set: AppointmentUpdate = serde_json::from_str(r#"{"technician_id":7}"#).unwrap();
        assert_eq!(set.technician_id, Some(Some(7)));
    }

    #[test]
    fn no_show_is_snake_case() {
        let json = serde_json::to_string(&AppointmentStatus::NoShow).unwrap();
        assert_eq!(json, "\"no_show\"");
    }
}

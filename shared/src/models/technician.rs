//! Technician Model

use serde::{Deserialize, Serialize};

/// Technician entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Technician {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// ppf / ceramic / detailing / washing ...
    pub specialty: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create technician payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianCreate {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
}

/// Update technician payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicianUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
    pub is_active: Option<bool>,
}

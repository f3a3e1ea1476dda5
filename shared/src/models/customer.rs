//! Customer & Vehicle Models

use serde::{Deserialize, Serialize};

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub vehicles: Vec<VehicleCreate>,
}

/// Update customer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Vehicle entity, owned by a customer.
///
/// The `ppf_*` columns hold the customer's paint protection film preferences
/// for this vehicle; all of them are empty when no PPF work was discussed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Vehicle {
    pub id: i64,
    pub customer_id: i64,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub plate_number: Option<String>,
    pub vin: Option<String>,
    /// hatchback / sedan / suv / bike ...
    pub vehicle_type: Option<String>,
    pub ppf_category: Option<String>,
    pub ppf_variant: Option<String>,
    pub ppf_warranty_years: Option<i32>,
    pub ppf_quoted_price: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Vehicle {
    /// Label used for denormalized `vehicle_name` fields, e.g. `Toyota Fortuner (KA01AB1234)`
    pub fn display_name(&self) -> String {
        match self.plate_number.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(plate) => format!("{} {} ({})", self.make, self.model, plate),
            None => format!("{} {}", self.make, self.model),
        }
    }

    pub fn has_ppf_preference(&self) -> bool {
        self.ppf_category.is_some()
    }
}

/// Create vehicle payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleCreate {
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub plate_number: Option<String>,
    pub vin: Option<String>,
    pub vehicle_type: Option<String>,
    pub ppf_category: Option<String>,
    pub ppf_variant: Option<String>,
    pub ppf_warranty_years: Option<i32>,
    pub ppf_quoted_price: Option<f64>,
}

/// Update vehicle payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleUpdate {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub plate_number: Option<String>,
    pub vin: Option<String>,
    pub vehicle_type: Option<String>,
    pub ppf_category: Option<String>,
    pub ppf_variant: Option<String>,
    pub ppf_warranty_years: Option<i32>,
    pub ppf_quoted_price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(plate: Option<&str>) -> Vehicle {
        Vehicle {
            id: 1,
            customer_id: 1,
            make: "Toyota".into(),
            model: "Fortuner".into(),
            year: Some(2022),
            color: None,
            plate_number: plate.map(Into::into),
            vin: None,
            vehicle_type: Some("suv".into()),
            ppf_category: None,
            ppf_variant: None,
            ppf_warranty_years: None,
            ppf_quoted_price: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn display_name_includes_plate_when_present() {
        assert_eq!(
            vehicle(Some("KA01AB1234")).display_name(),
            "Toyota Fortuner (KA01AB1234)"
        );
        assert_eq!(vehicle(None).display_name(), "Toyota Fortuner");
        assert_eq!(vehicle(Some("  ")).display_name(), "Toyota Fortuner");
    }

    #[test]
    fn customer_create_defaults_to_no_vehicles() {
        let payload: CustomerCreate =
            serde_json::from_str(r#"{"name":"Asha","phone":"9800000000"}"#).unwrap();
        assert!(payload.vehicles.is_empty());
        assert!(payload.email.is_none());
    }
}

//! Price inquiry conversion
//!
//! An inquiry becomes a customer by phone number: an existing customer with
//! the same phone is reused, otherwise a new one is created (with a vehicle
//! when the inquiry names both make and model).

use shared::error::ErrorCode;
use shared::models::{CustomerCreate, InquiryConversion, InquiryStatus, VehicleCreate};
use sqlx::SqlitePool;

use crate::db;
use crate::db::repository::{customer, inquiry};
use crate::utils::{AppError, AppResult};

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub async fn convert(pool: &SqlitePool, id: i64) -> AppResult<InquiryConversion> {
    let mut tx = db::begin(pool).await?;
    let lead = inquiry::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InquiryNotFound).with_detail("inquiry_id", id))?;
    if lead.status == InquiryStatus::Converted {
        return Err(AppError::new(ErrorCode::InquiryAlreadyConverted)
            .with_detail("customer_id", lead.customer_id.unwrap_or_default()));
    }

    let (customer_id, customer_created) = match customer::find_by_phone(&mut *tx, &lead.phone).await? {
        Some(existing) => (existing.id, false),
        None => {
            let vehicles = match (non_blank(&lead.vehicle_make), non_blank(&lead.vehicle_model)) {
                (Some(make), Some(model)) => vec![VehicleCreate {
                    make,
                    model,
                    ..Default::default()
                }],
                _ => vec![],
            };
            let new_id = customer::insert(
                &mut tx,
                &CustomerCreate {
                    name: lead.name.clone(),
                    phone: lead.phone.clone(),
                    email: lead.email.clone(),
                    address: None,
                    notes: lead.message.clone(),
                    vehicles,
                },
            )
            .await?;
            (new_id, true)
        }
    };

    inquiry::link_customer(&mut tx, id, customer_id).await?;
    let converted = inquiry::find_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InquiryNotFound))?;
    db::commit(tx).await?;

    tracing::info!(inquiry_id = id, customer_id, customer_created, "Inquiry converted");
    Ok(InquiryConversion {
        inquiry: converted,
        customer_id,
        customer_created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{seed_customer, test_pool};
    use crate::db::repository::vehicle;
    use shared::models::InquiryCreate;

    fn lead(phone: &str, make: Option<&str>, model: Option<&str>) -> InquiryCreate {
        InquiryCreate {
            name: "Meera Nair".into(),
            phone: phone.into(),
            email: None,
            vehicle_make: make.map(Into::into),
            vehicle_model: model.map(Into::into),
            service_type: "Full body PPF".into(),
            message: Some("Price for matte finish?".into()),
            quoted_price: None,
        }
    }

    #[tokio::test]
    async fn new_phone_creates_customer_with_vehicle() {
        let pool = test_pool().await;
        let inq = inquiry::create(&pool, lead("9111111111", Some("Kia"), Some("Seltos"))).await.unwrap();

        let result = convert(&pool, inq.id).await.unwrap();
        assert!(result.customer_created);
        assert_eq!(result.inquiry.status, InquiryStatus::Converted);
        assert_eq!(result.inquiry.customer_id, Some(result.customer_id));

        let vehicles = vehicle::find_by_customer(&pool, result.customer_id).await.unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].model, "Seltos");

        let err = convert(&pool, inq.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InquiryAlreadyConverted);
    }

    #[tokio::test]
    async fn known_phone_reuses_customer() {
        let pool = test_pool().await;
        let existing = seed_customer(&pool, "9222222222").await;
        let inq = inquiry::create(&pool, lead("9222222222", None, Some("Seltos"))).await.unwrap();

        let result = convert(&pool, inq.id).await.unwrap();
        assert!(!result.customer_created);
        assert_eq!(result.customer_id, existing.id);
        assert_eq!(vehicle::find_by_customer(&pool, existing.id).await.unwrap().len(), 1);
    }
}

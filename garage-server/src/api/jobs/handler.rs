//! Job API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::ErrorCode;
use shared::models::{
    Invoice, Job, JobCreate, JobUpdate, MaterialUsageInput, PaymentInput, StageChange, StageCount,
    TechnicianAssignment,
};

use crate::core::ServerState;
use crate::db::repository::invoice;
use crate::db::repository::job::{self, JobFilter};
use crate::services::{billing, jobs};
use crate::utils::{AppError, AppResult};

/// GET /api/jobs?stage=&customer_id=&technician_id= - rows without child records
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<JobFilter>,
) -> AppResult<Json<Vec<Job>>> {
    Ok(Json(job::find_all(&state.pool, &filter).await?))
}

/// GET /api/jobs/funnel - job count per stage
pub async fn funnel(State(state): State<ServerState>) -> AppResult<Json<Vec<StageCount>>> {
    Ok(Json(job::stage_counts(&state.pool).await?))
}

/// GET /api/jobs/:id - job with service items, payments and materials
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Job>> {
    let job = job::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::JobNotFound).with_detail("job_id", id))?;
    Ok(Json(job))
}

/// POST /api/jobs
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<JobCreate>,
) -> AppResult<Json<Job>> {
    Ok(Json(jobs::create(&state.pool, &payload).await?))
}

/// PUT /api/jobs/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<JobUpdate>,
) -> AppResult<Json<Job>> {
    Ok(Json(jobs::update(&state.pool, id, &payload).await?))
}

/// DELETE /api/jobs/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    jobs::delete(&state.pool, id).await?;
    Ok(Json(true))
}

/// PATCH /api/jobs/:id/stage
pub async fn change_stage(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StageChange>,
) -> AppResult<Json<Job>> {
    Ok(Json(jobs::change_stage(&state.pool, id, payload.stage).await?))
}

/// PATCH /api/jobs/:id/technician - `{"technician_id": null}` unassigns
pub async fn assign_technician(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TechnicianAssignment>,
) -> AppResult<Json<Job>> {
    Ok(Json(
        jobs::assign_technician(&state.pool, id, payload.technician_id).await?,
    ))
}

/// POST /api/jobs/:id/payments
pub async fn add_payment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentInput>,
) -> AppResult<Json<Job>> {
    Ok(Json(billing::add_payment(&state.pool, id, &payload).await?))
}

/// DELETE /api/jobs/:id/payments/:payment_id
pub async fn remove_payment(
    State(state): State<ServerState>,
    Path((id, payment_id)): Path<(i64, i64)>,
) -> AppResult<Json<Job>> {
    Ok(Json(billing::remove_payment(&state.pool, id, payment_id).await?))
}

/// POST /api/jobs/:id/materials - body is a list of usages
pub async fn add_materials(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<Vec<MaterialUsageInput>>,
) -> AppResult<Json<Job>> {
    Ok(Json(jobs::add_materials(&state.pool, id, &payload).await?))
}

/// DELETE /api/jobs/:id/materials/:material_id - return to stock
pub async fn remove_material(
    State(state): State<ServerState>,
    Path((id, material_id)): Path<(i64, i64)>,
) -> AppResult<Json<Job>> {
    Ok(Json(jobs::remove_material(&state.pool, id, material_id).await?))
}

/// POST /api/jobs/:id/invoice - manual generation for completed jobs
pub async fn generate_invoice(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Invoice>> {
    Ok(Json(billing::generate_invoice(&state.pool, id).await?))
}

/// GET /api/jobs/:id/invoice
pub async fn get_invoice(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Invoice>> {
    if job::find_row(&state.pool, id).await?.is_none() {
        return Err(AppError::new(ErrorCode::JobNotFound).with_detail("job_id", id));
    }
    let inv = invoice::find_detail_by_job(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound).with_detail("job_id", id))?;
    Ok(Json(inv))
}

#[cfg(test)]
mod tests {
    use crate::services::http::testing::{send, test_router};
    use axum::Router;
    use http::StatusCode;
    use serde_json::{Value, json};

    /// Customer with one vehicle; returns (customer_id, vehicle_id)
    async fn seed(router: &Router) -> (i64, i64) {
        let (status, body) = send(
            router,
            "POST",
            "/api/customers",
            Some(json!({
                "name": "Anita Desai",
                "phone": "9845012345",
                "vehicles": [{
                    "make": "Toyota",
                    "model": "Fortuner",
                    "plate_number": "KA01AB1234",
                    "ppf_category": "full_body",
                    "ppf_variant": "gloss",
                    "ppf_warranty_years": 5
                }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        (body["id"].as_i64().unwrap(), body["vehicles"][0]["id"].as_i64().unwrap())
    }

    async fn create_job(router: &Router, customer_id: i64, vehicle_id: i64) -> Value {
        let (status, body) = send(
            router,
            "POST",
            "/api/jobs",
            Some(json!({
                "customer_id": customer_id,
                "vehicle_id": vehicle_id,
                "service_items": [
                    { "name": "Full body PPF", "price": 85000.0 },
                    { "name": "Headlight film", "price": 2500.0, "quantity": 2 }
                ],
                "tax_rate": 18.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    #[tokio::test]
    async fn funnel_to_paid_invoice() {
        let router = test_router().await;
        let (cid, vid) = seed(&router).await;
        let job = create_job(&router, cid, vid).await;
        let id = job["id"].as_i64().unwrap();
        assert_eq!(job["job_number"], "JOB-00001");
        assert_eq!(job["total"], 106200.0);
        assert_eq!(job["vehicle_name"], "Toyota Fortuner (KA01AB1234)");

        let (_, funnel) = send(&router, "GET", "/api/jobs/funnel", None).await;
        let new_count = funnel
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["stage"] == "new")
            .unwrap()["count"]
            .clone();
        assert_eq!(new_count, 1);

        let (status, _) = send(&router, "GET", &format!("/api/jobs/{id}/invoice"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &router,
            "PATCH",
            &format!("/api/jobs/{id}/stage"),
            Some(json!({ "stage": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["invoice_id"].is_i64());

        let (status, inv) = send(&router, "GET", &format!("/api/jobs/{id}/invoice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(inv["invoice_number"], "INV-00001");
        assert_eq!(inv["status"], "unpaid");
        let invoice_id = inv["id"].as_i64().unwrap();

        let (status, body) = send(
            &router,
            "POST",
            &format!("/api/invoices/{invoice_id}/payments"),
            Some(json!({ "amount": 106200.0, "method": "upi", "reference": "UPI-889" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "paid");
        assert_eq!(body["balance"], 0.0);

        let (status, body) = send(
            &router,
            "POST",
            &format!("/api/jobs/{id}/payments"),
            Some(json!({ "amount": 1.0, "method": "cash" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], 5003);

        let (_, outbox) = send(&router, "GET", &format!("/api/notifications?job_id={id}"), None).await;
        let events: Vec<&str> = outbox
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["event"].as_str().unwrap())
            .collect();
        assert!(events.contains(&"job_completed"));
        assert!(events.contains(&"payment_received"));

        let (_, summary) = send(&router, "GET", "/api/dashboard/summary", None).await;
        assert_eq!(summary["revenue_collected"], 106200.0);
        assert_eq!(summary["outstanding_balance"], 0.0);
        assert_eq!(summary["completed_this_month"], 1);
    }

    #[tokio::test]
    async fn terminal_jobs_are_locked() {
        let router = test_router().await;
        let (cid, vid) = seed(&router).await;
        let id = create_job(&router, cid, vid).await["id"].as_i64().unwrap();

        let (status, _) = send(
            &router,
            "PATCH",
            &format!("/api/jobs/{id}/stage"),
            Some(json!({ "stage": "cancelled" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &router,
            "PATCH",
            &format!("/api/jobs/{id}/stage"),
            Some(json!({ "stage": "in_progress" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 2002);

        let (status, _) = send(
            &router,
            "PUT",
            &format!("/api/jobs/{id}"),
            Some(json!({ "notes": "late change" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&router, "DELETE", &format!("/api/customers/{cid}"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn list_filters_by_stage() {
        let router = test_router().await;
        let (cid, vid) = seed(&router).await;
        create_job(&router, cid, vid).await;
        let second = create_job(&router, cid, vid).await["id"].as_i64().unwrap();
        send(
            &router,
            "PATCH",
            &format!("/api/jobs/{second}/stage"),
            Some(json!({ "stage": "inspection" })),
        )
        .await;

        let (status, body) = send(&router, "GET", "/api/jobs?stage=inspection", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], second);
        assert!(rows[0]["service_items"].as_array().unwrap().is_empty());

        let (_, history) = send(&router, "GET", &format!("/api/customers/{cid}/jobs"), None).await;
        assert_eq!(history.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_job_is_404() {
        let router = test_router().await;
        let (status, body) = send(&router, "GET", "/api/jobs/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 2001);
    }
}

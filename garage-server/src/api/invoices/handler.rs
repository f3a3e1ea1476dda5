//! Invoice API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{Invoice, PaymentInput, PaymentStatus};

use crate::core::ServerState;
use crate::db::repository::invoice;
use crate::services::billing;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<PaymentStatus>,
}

/// GET /api/invoices?status=unpaid|partial|paid
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Invoice>>> {
    Ok(Json(invoice::find_all(&state.pool, query.status).await?))
}

/// GET /api/invoices/:id - invoice with line items
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Invoice>> {
    let inv = invoice::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvoiceNotFound).with_detail("invoice_id", id))?;
    Ok(Json(inv))
}

/// POST /api/invoices/:id/payments - pay the invoice's job
pub async fn add_payment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentInput>,
) -> AppResult<Json<Invoice>> {
    Ok(Json(billing::pay_invoice(&state.pool, id, &payload).await?))
}

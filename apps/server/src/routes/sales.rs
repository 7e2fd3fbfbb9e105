//! # Sales
//!
//! Checkout runs the sale engine line by line and answers with the
//! per-line outcome plus the invoice for whatever committed.
//!
//! ```text
//! every line committed                 ──► 201 Created
//! some lines committed                 ──► 207 Multi-Status
//! nothing committed, storage failed    ──► 503 Service Unavailable
//! nothing committed, lines rejected    ──► 422 Unprocessable Entity
//! ```
//!
//! The body has the same shape in all three cases; `invoice` is null when
//! nothing committed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use spares_core::report::SalesStats;
use spares_core::sale::SaleLine;
use spares_core::{
    checkout, Checkout, FailureKind, InvoiceDocument, InvoiceStatus, SaleRequest,
    SalesHistoryRecord,
};
use spares_db::generate_invoice_number;

use crate::error::{ApiError, ApiResult};
use crate::extract::ShopRequester;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/sales-history", get(sales_history))
        .route("/sales-stats", get(sales_stats))
        .route("/invoices/{invoice_number}", get(invoice))
        .route("/invoices/{invoice_number}/text", get(invoice_text))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub customer_name: String,
    /// Generated when absent.
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub lines: Vec<SaleLine>,
}

/// A fully rejected checkout that hit storage trouble is retryable, so it
/// answers 503 rather than 422.
fn checkout_status(result: &Checkout) -> StatusCode {
    match (result.status, result.failure_kind) {
        (InvoiceStatus::Completed, _) => StatusCode::CREATED,
        (InvoiceStatus::Partial, _) => StatusCode::MULTI_STATUS,
        (InvoiceStatus::Rejected, Some(FailureKind::Persistence)) => StatusCode::SERVICE_UNAVAILABLE,
        (InvoiceStatus::Rejected, _) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// POST /api/checkout
async fn create_checkout(
    State(state): State<AppState>,
    requester: ShopRequester,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<Checkout>)> {
    let invoice_number = req
        .invoice_number
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(generate_invoice_number);

    let request = SaleRequest {
        customer_name: req.customer_name,
        invoice_number,
        lines: req.lines,
    };

    let result = checkout(&state.db, &requester, request).await?;
    Ok((checkout_status(&result), Json(result)))
}

/// GET /api/sales-history - newest first
async fn sales_history(
    State(state): State<AppState>,
    requester: ShopRequester,
) -> ApiResult<Json<Vec<SalesHistoryRecord>>> {
    Ok(Json(state.db.sales().list_by_shop(requester.email()).await?))
}

/// GET /api/sales-stats
async fn sales_stats(
    State(state): State<AppState>,
    requester: ShopRequester,
) -> ApiResult<Json<SalesStats>> {
    let records = state.db.sales().list_by_shop(requester.email()).await?;
    Ok(Json(SalesStats::from_records(&records)))
}

/// GET /api/invoices/{invoice_number}
async fn invoice(
    State(state): State<AppState>,
    requester: ShopRequester,
    Path(invoice_number): Path<String>,
) -> ApiResult<Json<InvoiceDocument>> {
    Ok(Json(load_invoice(&state, &requester, &invoice_number).await?))
}

/// GET /api/invoices/{invoice_number}/text - plain-text rendering
async fn invoice_text(
    State(state): State<AppState>,
    requester: ShopRequester,
    Path(invoice_number): Path<String>,
) -> ApiResult<String> {
    Ok(load_invoice(&state, &requester, &invoice_number)
        .await?
        .to_string())
}

/// Rebuilds an invoice from the ledger. Only the requester's own records
/// are visible.
async fn load_invoice(
    state: &AppState,
    requester: &ShopRequester,
    invoice_number: &str,
) -> ApiResult<InvoiceDocument> {
    let shop = state
        .db
        .shops()
        .get_by_email(requester.email())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let records = state
        .db
        .sales()
        .list_by_invoice(requester.email(), invoice_number)
        .await?;

    InvoiceDocument::from_records(&shop, &records)
        .ok_or_else(|| ApiError::not_found(format!("Invoice not found: {}", invoice_number)))
}

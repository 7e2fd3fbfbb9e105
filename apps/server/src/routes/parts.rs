//! # Parts
//!
//! Inventory listing and owner-only edits. `sell-part` is the single-line
//! decrement: it moves stock without writing a ledger record. Multi-line
//! sales with invoices go through `/api/checkout`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use spares_core::report::{gst_summary, GstSummaryRow};
use spares_core::validation::{
    coerce_gst_rate, validate_hsn_code, validate_part_draft, GstRateInput, PartInput,
};
use spares_core::Part;
use spares_db::generate_id;
use tracing::info;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::extract::ShopRequester;
use crate::routes::Message;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/all-parts", get(all_parts))
        .route("/my-parts", get(my_parts))
        .route("/add-part", post(add_part))
        .route("/update-part/{id}", put(update_part))
        .route("/delete-part/{id}", delete(delete_part))
        .route("/sell-part/{id}", put(sell_part))
        .route("/update-part-gst/{id}", put(update_part_gst))
        .route("/parts-by-hsn/{hsn}", get(parts_by_hsn))
        .route("/gst-summary", get(my_gst_summary))
}

#[derive(Debug, Serialize)]
pub struct PartResponse {
    pub message: String,
    pub part: Part,
}

#[derive(Debug, Deserialize)]
pub struct SellRequest {
    #[serde(rename = "sellQuantity", alias = "sell_quantity")]
    pub sell_quantity: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SellResponse {
    pub message: String,
    pub quantity_owned: i64,
    pub part_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PartGstRequest {
    pub gst_rate: Option<GstRateInput>,
    pub hsn_code: Option<String>,
}

// =============================================================================
// Listing
// =============================================================================

/// GET /api/all-parts
async fn all_parts(State(state): State<AppState>) -> ApiResult<Json<Vec<Part>>> {
    Ok(Json(state.db.parts().list_all().await?))
}

/// GET /api/my-parts
async fn my_parts(
    State(state): State<AppState>,
    requester: ShopRequester,
) -> ApiResult<Json<Vec<Part>>> {
    Ok(Json(state.db.parts().list_by_owner(requester.email()).await?))
}

/// GET /api/parts-by-hsn/{hsn}
async fn parts_by_hsn(
    State(state): State<AppState>,
    Path(hsn): Path<String>,
) -> ApiResult<Json<Vec<Part>>> {
    Ok(Json(state.db.parts().list_by_hsn(hsn.trim()).await?))
}

/// GET /api/gst-summary
async fn my_gst_summary(
    State(state): State<AppState>,
    requester: ShopRequester,
) -> ApiResult<Json<Vec<GstSummaryRow>>> {
    let parts = state.db.parts().list_by_owner(requester.email()).await?;
    Ok(Json(gst_summary(&parts)))
}

// =============================================================================
// Owner Edits
// =============================================================================

/// POST /api/add-part
async fn add_part(
    State(state): State<AppState>,
    requester: ShopRequester,
    Json(input): Json<PartInput>,
) -> ApiResult<(StatusCode, Json<PartResponse>)> {
    let draft = validate_part_draft(input)?;

    if !state.db.shops().email_exists(requester.email()).await? {
        return Err(ApiError::not_found("User not found"));
    }

    let part = Part::from_draft(generate_id(), requester.email(), draft, Utc::now());
    let part = state.db.parts().insert(&part).await?;

    info!(id = %part.id, owner = %part.owner_email, name = %part.name, "Part added");
    Ok((
        StatusCode::CREATED,
        Json(PartResponse {
            message: "Part added successfully".to_string(),
            part,
        }),
    ))
}

/// PUT /api/update-part/{id}
async fn update_part(
    State(state): State<AppState>,
    requester: ShopRequester,
    Path(id): Path<String>,
    Json(input): Json<PartInput>,
) -> ApiResult<Json<PartResponse>> {
    let mut part = owned_part(&state, &requester, &id, "update").await?;
    let draft = validate_part_draft(input)?;

    part.apply_draft(draft, Utc::now());
    state.db.parts().update(&part).await?;

    info!(id = %part.id, owner = %part.owner_email, "Part updated");
    Ok(Json(PartResponse {
        message: "Part updated successfully".to_string(),
        part,
    }))
}

/// DELETE /api/delete-part/{id}
async fn delete_part(
    State(state): State<AppState>,
    requester: ShopRequester,
    Path(id): Path<String>,
) -> ApiResult<Json<Message>> {
    owned_part(&state, &requester, &id, "delete").await?;
    state.db.parts().delete(&id, requester.email()).await?;

    info!(id = %id, owner = %requester.email(), "Part deleted");
    Ok(Json(Message::new("Part deleted successfully")))
}

/// PUT /api/update-part-gst/{id}
async fn update_part_gst(
    State(state): State<AppState>,
    requester: ShopRequester,
    Path(id): Path<String>,
    Json(req): Json<PartGstRequest>,
) -> ApiResult<Json<PartResponse>> {
    owned_part(&state, &requester, &id, "update").await?;

    let gst_rate = coerce_gst_rate(req.gst_rate.as_ref());
    let hsn_code = validate_hsn_code(req.hsn_code.as_deref())?;

    let parts = state.db.parts();
    parts
        .update_gst(&id, requester.email(), gst_rate, hsn_code.as_deref())
        .await?;
    let part = parts
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Part not found"))?;

    Ok(Json(PartResponse {
        message: "GST details updated successfully".to_string(),
        part,
    }))
}

// =============================================================================
// Single-Part Sale
// =============================================================================

/// PUT /api/sell-part/{id}
///
/// ```text
/// sellQuantity missing or < 1    ──► 400
/// part missing or not owned      ──► 404
/// sellQuantity > quantity_owned  ──► 400 INSUFFICIENT_STOCK
/// ```
async fn sell_part(
    State(state): State<AppState>,
    requester: ShopRequester,
    Path(id): Path<String>,
    Json(req): Json<SellRequest>,
) -> ApiResult<Json<SellResponse>> {
    let quantity = req
        .sell_quantity
        .filter(|q| *q >= 1)
        .ok_or_else(|| ApiError::validation("Invalid sell quantity"))?;

    let parts = state.db.parts();
    let part = parts
        .get_by_id(&id)
        .await?
        .filter(|part| requester.owns(part))
        .ok_or_else(|| ApiError::not_found("Part not found or you do not own this part"))?;

    if quantity > part.quantity_owned {
        return Err(insufficient_stock());
    }

    // The conditional decrement still decides: a concurrent sale may have
    // taken the stock since the read above.
    let updated = parts
        .decrement_if_available(&id, quantity)
        .await?
        .ok_or_else(insufficient_stock)?;

    info!(
        id = %updated.id,
        owner = %requester.email(),
        sold = quantity,
        remaining = updated.quantity_owned,
        "Part sold"
    );

    Ok(Json(SellResponse {
        message: "Part sold successfully".to_string(),
        quantity_owned: updated.quantity_owned,
        part_name: updated.name,
    }))
}

fn insufficient_stock() -> ApiError {
    ApiError::new(
        ErrorCode::InsufficientStock,
        "Sell quantity exceeds available quantity",
    )
}

/// Loads a part the requester may edit: 404 when missing, 403 when it
/// belongs to another shop.
async fn owned_part(
    state: &AppState,
    requester: &ShopRequester,
    id: &str,
    action: &str,
) -> ApiResult<Part> {
    let part = state
        .db
        .parts()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Part not found: {}", id)))?;

    if !requester.owns(&part) {
        return Err(ApiError::forbidden(format!(
            "You are not allowed to {} this part",
            action
        )));
    }

    Ok(part)
}

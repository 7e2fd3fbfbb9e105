//! # Admin Back Office
//!
//! Mounted at `/api/admin`. Apart from `login`, every route takes an
//! [`AdminRequester`], so a request without a known `x-admin-email` never
//! reaches the handler.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use spares_core::report::{inventory_value, DashboardStats};
use spares_core::{Part, ShopOwner, ShopProfile};
use spares_db::PartListing;
use tracing::info;

use crate::auth::verify_password;
use crate::error::{ApiError, ApiResult};
use crate::extract::AdminRequester;
use crate::state::AppState;

/// How many rows the "recent" panels show.
const RECENT_LIMIT: u32 = 5;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/users", get(users))
        .route("/users/{email}", delete(delete_user))
        .route("/parts", get(parts))
        .route("/dashboard-stats", get(dashboard_stats))
        .route("/recent-users", get(recent_users))
        .route("/recent-parts", get(recent_parts))
        .route("/shops-with-gst", get(shops_with_gst))
        .route("/shops-without-gst", get(shops_without_gst))
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub message: String,
    pub admin: AdminInfo,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: String,
    pub parts_removed: u64,
}

fn profiles(shops: Vec<ShopOwner>) -> Json<Vec<ShopProfile>> {
    Json(shops.iter().map(ShopOwner::profile).collect())
}

fn count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}

/// POST /api/admin/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> ApiResult<Json<AdminLoginResponse>> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::validation("Please provide email and password"));
    };

    let admin = state
        .db
        .admins()
        .get_by_email(email.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;

    if !verify_password(&password, &admin.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    info!(email = %admin.email, "Admin login");
    Ok(Json(AdminLoginResponse {
        message: "Admin login successful".to_string(),
        admin: AdminInfo {
            id: admin.id,
            email: admin.email,
        },
    }))
}

/// GET /api/admin/users
async fn users(
    State(state): State<AppState>,
    _admin: AdminRequester,
) -> ApiResult<Json<Vec<ShopProfile>>> {
    Ok(profiles(state.db.shops().list_all().await?))
}

/// DELETE /api/admin/users/{email} - parts go with the shop, sales history stays
async fn delete_user(
    State(state): State<AppState>,
    admin: AdminRequester,
    Path(email): Path<String>,
) -> ApiResult<Json<DeleteUserResponse>> {
    let parts_removed = state.db.shops().delete(email.trim()).await?;

    info!(admin = %admin.email, email = %email, parts_removed, "Shop removed by admin");
    Ok(Json(DeleteUserResponse {
        message: "User and associated parts deleted successfully".to_string(),
        parts_removed,
    }))
}

/// GET /api/admin/parts
async fn parts(
    State(state): State<AppState>,
    _admin: AdminRequester,
) -> ApiResult<Json<Vec<PartListing>>> {
    Ok(Json(state.db.parts().list_with_shop().await?))
}

/// GET /api/admin/dashboard-stats
async fn dashboard_stats(
    State(state): State<AppState>,
    _admin: AdminRequester,
) -> ApiResult<Json<DashboardStats>> {
    let shops = state.db.shops();
    let parts = state.db.parts();
    let all_parts = parts.list_all().await?;

    Ok(Json(DashboardStats {
        total_users: count(shops.count().await?),
        total_parts: count(parts.count().await?),
        gst_registered_users: count(shops.count_gst_registered().await?),
        total_inventory_value: inventory_value(&all_parts),
    }))
}

/// GET /api/admin/recent-users
async fn recent_users(
    State(state): State<AppState>,
    _admin: AdminRequester,
) -> ApiResult<Json<Vec<ShopProfile>>> {
    Ok(profiles(state.db.shops().recent(RECENT_LIMIT).await?))
}

/// GET /api/admin/recent-parts
async fn recent_parts(
    State(state): State<AppState>,
    _admin: AdminRequester,
) -> ApiResult<Json<Vec<Part>>> {
    Ok(Json(state.db.parts().recent(RECENT_LIMIT).await?))
}

/// GET /api/admin/shops-with-gst
async fn shops_with_gst(
    State(state): State<AppState>,
    _admin: AdminRequester,
) -> ApiResult<Json<Vec<ShopProfile>>> {
    Ok(profiles(state.db.shops().list_with_gst().await?))
}

/// GET /api/admin/shops-without-gst
async fn shops_without_gst(
    State(state): State<AppState>,
    _admin: AdminRequester,
) -> ApiResult<Json<Vec<ShopProfile>>> {
    Ok(profiles(state.db.shops().list_without_gst().await?))
}

//! # Shop Accounts
//!
//! Registration, login, password reset and profile management for shop
//! owners.
//!
//! ```text
//! POST /api/register            create a shop            201 | 400 | 409
//! POST /api/login               check credentials        200 | 404 | 401
//! POST /api/forgot-password     reset password           200 | 404
//! GET  /api/check-email/{email} is the email taken
//! POST /api/validate-gst        GSTIN format check
//! GET  /api/user-profile        requester's profile
//! PUT  /api/update-profile      edit profile (+password) 200 | 401 | 409
//! PUT  /api/update-gst          set GSTIN
//! GET  /api/shop-owners?email=  public shop lookup
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use spares_core::validation::{
    is_valid_gstin, validate_email, validate_gstin, validate_optional_gstin, validate_password,
    validate_phone, validate_text,
};
use spares_core::{ShopOwner, ShopProfile};
use spares_db::{generate_id, ShopProfileUpdate};
use tracing::info;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::extract::ShopRequester;
use crate::routes::Message;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 100;
const MAX_LOCATION_LEN: usize = 200;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/check-email/{email}", get(check_email))
        .route("/validate-gst", post(validate_gst))
        .route("/user-profile", get(user_profile))
        .route("/update-profile", put(update_profile))
        .route("/update-gst", put(update_gst))
        .route("/shop-owners", get(shop_owners))
}

// =============================================================================
// Request / Response Bodies
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(alias = "name")]
    pub owner_name: Option<String>,
    pub shop_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub shop_location: Option<String>,
    pub phone: Option<String>,
    pub gst_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
    #[serde(alias = "newPassword")]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(alias = "name")]
    pub owner_name: Option<String>,
    pub shop_name: Option<String>,
    pub phone: Option<String>,
    pub shop_location: Option<String>,
    pub email: Option<String>,
    pub gst_number: Option<String>,
    #[serde(alias = "currentPassword")]
    pub current_password: Option<String>,
    #[serde(alias = "newPassword")]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GstRequest {
    pub gst_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShopOwnersQuery {
    pub email: Option<String>,
}

/// A message plus the shop it concerns.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: ShopProfile,
}

#[derive(Debug, Serialize)]
pub struct EmailCheckResponse {
    pub exists: bool,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct GstCheckResponse {
    pub valid: bool,
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ProfileResponse>)> {
    let owner_name = validate_text("name", req.owner_name.as_deref(), MAX_NAME_LEN)?;
    let shop_name = validate_text("shop_name", req.shop_name.as_deref(), MAX_NAME_LEN)?;
    let shop_location =
        validate_text("shop_location", req.shop_location.as_deref(), MAX_LOCATION_LEN)?;
    let email = validate_email(req.email.as_deref().unwrap_or_default())?;
    let phone = validate_phone(req.phone.as_deref().unwrap_or_default())?;
    let password = req.password.unwrap_or_default();
    validate_password("password", &password)?;
    let gst_number = validate_optional_gstin(req.gst_number.as_deref())?;

    let now = Utc::now();
    let shop = ShopOwner {
        id: generate_id(),
        email,
        owner_name,
        shop_name,
        shop_location,
        phone,
        gst_number,
        password_hash: hash_password(&password)?,
        created_at: now,
        updated_at: now,
    };

    state.db.shops().insert(&shop).await?;
    info!(email = %shop.email, shop = %shop.shop_name, "Shop registered");

    Ok((
        StatusCode::CREATED,
        Json(ProfileResponse {
            message: "Registration successful".to_string(),
            user: shop.profile(),
        }),
    ))
}

/// POST /api/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::validation("Please provide email and password"));
    };

    let shop = state
        .db
        .shops()
        .get_by_email(email.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("Email not found"))?;

    if !verify_password(&password, &shop.password_hash) {
        return Err(ApiError::unauthorized("Incorrect password"));
    }

    info!(email = %shop.email, "Shop login");
    Ok(Json(ProfileResponse {
        message: "Login successful".to_string(),
        user: shop.profile(),
    }))
}

/// POST /api/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<Message>> {
    let email = validate_text("email", req.email.as_deref(), 254)?;
    let new_password = req.new_password.unwrap_or_default();
    validate_password("new_password", &new_password)?;

    if !state.db.shops().email_exists(&email).await? {
        return Err(ApiError::not_found("Email not found"));
    }

    let hash = hash_password(&new_password)?;
    state.db.shops().update_password(&email, &hash).await?;

    info!(email = %email, "Password reset");
    Ok(Json(Message::new("Password updated successfully")))
}

/// GET /api/check-email/{email}
async fn check_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<EmailCheckResponse>> {
    let exists = state.db.shops().email_exists(email.trim()).await?;
    Ok(Json(EmailCheckResponse {
        exists,
        available: !exists,
    }))
}

/// POST /api/validate-gst - format check only, always 200 once a value is given
async fn validate_gst(Json(req): Json<GstRequest>) -> ApiResult<Json<GstCheckResponse>> {
    let gst_number = validate_text("gst_number", req.gst_number.as_deref(), 64)?;

    let response = if is_valid_gstin(&gst_number) {
        GstCheckResponse {
            valid: true,
            message: "Valid GST number format".to_string(),
        }
    } else {
        GstCheckResponse {
            valid: false,
            message: "Invalid GST number format. Expected format: 27ABCDE1234F1Z5".to_string(),
        }
    };

    Ok(Json(response))
}

/// GET /api/user-profile
async fn user_profile(
    State(state): State<AppState>,
    requester: ShopRequester,
) -> ApiResult<Json<ShopProfile>> {
    let shop = load_shop(&state, requester.email()).await?;
    Ok(Json(shop.profile()))
}

/// PUT /api/update-profile
///
/// A password change needs both `current_password` and `new_password`.
/// Parts follow an email change; sales history keeps the old email.
async fn update_profile(
    State(state): State<AppState>,
    requester: ShopRequester,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let update = ShopProfileUpdate {
        email: validate_email(req.email.as_deref().unwrap_or_default())?,
        owner_name: validate_text("name", req.owner_name.as_deref(), MAX_NAME_LEN)?,
        shop_name: validate_text("shop_name", req.shop_name.as_deref(), MAX_NAME_LEN)?,
        shop_location: validate_text(
            "shop_location",
            req.shop_location.as_deref(),
            MAX_LOCATION_LEN,
        )?,
        phone: validate_phone(req.phone.as_deref().unwrap_or_default())?,
        gst_number: validate_optional_gstin(req.gst_number.as_deref())?,
    };

    let shop = load_shop(&state, requester.email()).await?;

    let new_hash = match (req.current_password, req.new_password) {
        (Some(current), Some(new)) if !current.is_empty() && !new.is_empty() => {
            if !verify_password(&current, &shop.password_hash) {
                return Err(ApiError::unauthorized("Current password is incorrect"));
            }
            validate_password("new_password", &new)?;
            Some(hash_password(&new)?)
        }
        _ => None,
    };

    let updated = state
        .db
        .shops()
        .update_profile(requester.email(), &update)
        .await?;

    if let Some(hash) = &new_hash {
        state.db.shops().update_password(&updated.email, hash).await?;
    }

    info!(
        email = %requester.email(),
        new_email = %updated.email,
        password_changed = new_hash.is_some(),
        "Profile updated"
    );

    let message = if new_hash.is_some() {
        "Profile and password updated successfully"
    } else {
        "Profile updated successfully"
    };

    Ok(Json(ProfileResponse {
        message: message.to_string(),
        user: updated.profile(),
    }))
}

/// PUT /api/update-gst
async fn update_gst(
    State(state): State<AppState>,
    requester: ShopRequester,
    Json(req): Json<GstRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let gst_number = validate_gstin(req.gst_number.as_deref().unwrap_or_default())?;

    state
        .db
        .shops()
        .update_gst(requester.email(), &gst_number)
        .await?;

    let shop = load_shop(&state, requester.email()).await?;
    Ok(Json(ProfileResponse {
        message: "GST number updated successfully".to_string(),
        user: shop.profile(),
    }))
}

/// GET /api/shop-owners?email= - one shop when `email` is given, else all
async fn shop_owners(
    State(state): State<AppState>,
    Query(query): Query<ShopOwnersQuery>,
) -> ApiResult<Json<Vec<ShopProfile>>> {
    let shops = match query.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => state
            .db
            .shops()
            .get_by_email(email)
            .await?
            .into_iter()
            .collect(),
        _ => state.db.shops().list_all().await?,
    };

    Ok(Json(shops.iter().map(ShopOwner::profile).collect()))
}

async fn load_shop(state: &AppState, email: &str) -> ApiResult<ShopOwner> {
    state
        .db
        .shops()
        .get_by_email(email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

//! # Request Identity Extractors
//!
//! Every shop-scoped handler takes a [`ShopRequester`]; every admin handler
//! takes an [`AdminRequester`]. Identity is thereby an explicit handler
//! argument passed down into core calls, never ambient state.
//!
//! ```text
//!   x-user-email: shop@example.com   ──► ShopRequester(Requester)
//!   x-admin-email: admin@example.com ──► AdminRequester (must exist in admins)
//!
//!   header missing, blank, malformed ──► 401 UNAUTHORIZED
//!   admin header names no admin      ──► 403 FORBIDDEN
//! ```

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use spares_core::validation::validate_email;
use spares_core::Requester;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the acting shop owner's email.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Header carrying the acting admin's email.
pub const ADMIN_EMAIL_HEADER: &str = "x-admin-email";

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The shop owner a request acts for.
#[derive(Debug, Clone)]
pub struct ShopRequester(pub Requester);

impl Deref for ShopRequester {
    type Target = Requester;

    fn deref(&self) -> &Requester {
        &self.0
    }
}

impl FromRequestParts<AppState> for ShopRequester {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let email = header_value(parts, USER_EMAIL_HEADER).ok_or_else(|| {
            tracing::debug!(uri = %parts.uri, "Missing shop identity header");
            ApiError::unauthorized("Unauthorized: user email missing")
        })?;

        let email = validate_email(email).map_err(|_| {
            tracing::debug!(uri = %parts.uri, "Malformed shop identity header");
            ApiError::unauthorized("Unauthorized: user email is not a valid email address")
        })?;

        Requester::new(email)
            .map(ShopRequester)
            .map_err(|_| ApiError::unauthorized("Unauthorized: user email missing"))
    }
}

/// A verified admin.
#[derive(Debug, Clone)]
pub struct AdminRequester {
    pub email: String,
}

impl FromRequestParts<AppState> for AdminRequester {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let email = header_value(parts, ADMIN_EMAIL_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Unauthorized: admin email missing"))?
            .to_string();

        if !state.db.admins().exists(&email).await? {
            tracing::warn!(email = %email, uri = %parts.uri, "Admin access refused");
            return Err(ApiError::forbidden("Admin access required"));
        }

        Ok(AdminRequester { email })
    }
}

//! # HTTP Routes
//!
//! One module per area, each exposing `router()`. Everything except the
//! health check is mounted under `/api`.
//!
//! - [`health`] - `GET /` service and database status
//! - [`accounts`] - shop registration, login and profile
//! - [`parts`] - inventory listing, editing and single-part sales
//! - [`sales`] - checkout, sales history and invoices
//! - [`admin`] - back office under `/api/admin`

pub mod accounts;
pub mod admin;
pub mod health;
pub mod parts;
pub mod sales;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Routes mounted under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(accounts::router())
        .merge(parts::router())
        .merge(sales::router())
        .nest("/admin", admin::router())
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Message {
            message: message.into(),
        }
    }
}

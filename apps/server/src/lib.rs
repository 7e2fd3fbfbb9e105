//! # Spares POS Server
//!
//! JSON-over-HTTP surface for shop owners and admins.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP request                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CorsLayer ──► TraceLayer ──► Router                                    │
//! │                                 │                                       │
//! │                                 ├── GET /            health             │
//! │                                 ├── /api/*           accounts, parts,   │
//! │                                 │                    sales              │
//! │                                 └── /api/admin/*     back office        │
//! │                                                                         │
//! │  Handler: extract ShopRequester / AdminRequester from headers,          │
//! │           call spares-core / spares-db, map errors to ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.cors_allow_any {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

//! # Error Types
//!
//! Domain-specific error types for spares-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  spares-core errors (this file)                                        │
//! │  ├── CoreError        - Request-level sale failures                    │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── StoreError       - What a store trait reports when it fails       │
//! │                                                                         │
//! │  Per-line sale failures are NOT errors: they are                       │
//! │  `sale::LineRejection` values inside a successful `SaleOutcome`.       │
//! │                                                                         │
//! │  spares-db errors (separate crate)                                     │
//! │  └── DbError          - converts into StoreError                       │
//! │                                                                         │
//! │  HTTP errors (apps/server)                                             │
//! │  └── ApiError         - What clients see (serialized)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Taxonomy
//! Every failure maps onto one [`FailureKind`] so callers can tell a bad
//! request from a broken rule, a storage outage or a mixed invoice.

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Failure Kind
// =============================================================================

/// The four kinds of failure a caller must be able to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Bad input shape, rejected before any mutation.
    Validation,
    /// Insufficient stock or wrong owner, rejected before mutation.
    BusinessRule,
    /// Storage unreachable. Retryable.
    Persistence,
    /// Some lines of an invoice committed and some did not.
    PartialInvoice,
}

// =============================================================================
// Core Error
// =============================================================================

/// Errors that abort a whole sale request.
///
/// Anything raised here happens before the first line is touched, so no
/// stock has moved when a caller sees one.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The selling shop is not registered.
    #[error("Shop not found: {0}")]
    ShopNotFound(String),

    /// A store call failed outside per-line processing.
    #[error("Storage unavailable: {0}")]
    Store(#[from] StoreError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies the error for the caller.
    pub fn kind(&self) -> FailureKind {
        match self {
            CoreError::ShopNotFound(_) => FailureKind::BusinessRule,
            CoreError::Store(_) => FailureKind::Persistence,
            CoreError::Validation(_) => FailureKind::Validation,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., bad email, bad GSTIN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Failure reported by an `InventoryStore`, `SalesLedger` or `ShopDirectory`.
///
/// The core only needs to know that the write layer failed and why, so
/// storage engines collapse their own error types into this one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Storage could not be reached (pool closed, exhausted, I/O error).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Storage rejected the write (constraint, corrupt row).
    #[error("storage rejected operation: {0}")]
    Rejected(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

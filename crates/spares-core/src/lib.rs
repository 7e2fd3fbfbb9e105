//! # spares-core: Business Logic for Spares POS
//!
//! Everything an auto-spare-parts counter needs to decide, with no I/O of its
//! own: GST arithmetic, input rules, the per-line sale engine and invoice
//! formatting. Storage is reached only through the traits in [`store`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Spares POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/server (axum, JSON over HTTP)              │   │
//! │  │   /api/checkout  /api/add-part  /api/sales-stats  /api/admin/*  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ spares-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌───────┐ │   │
//! │  │   │  types  │  │   tax   │  │  sale   │  │ invoice │  │report │ │   │
//! │  │   │  Part   │  │ LineTax │  │executor │  │ words   │  │ stats │ │   │
//! │  │   └─────────┘  └─────────┘  └────┬────┘  └─────────┘  └───────┘ │   │
//! │  │                                  │ store traits                 │   │
//! │  └──────────────────────────────────┼──────────────────────────────┘   │
//! │                                     │                                   │
//! │  ┌──────────────────────────────────▼──────────────────────────────┐   │
//! │  │                  spares-db (SQLite via sqlx)                    │   │
//! │  │        InventoryStore • SalesLedger • ShopDirectory             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal rupee amounts
//! - [`types`] - Parts, shops, GST slabs, sales records
//! - [`tax`] - SGST/CGST split of a sale line
//! - [`validation`] - Input rules and lenient GST coercion
//! - [`store`] - Storage traits the engine is written against
//! - [`sale`] - Sale line validator and per-line executor
//! - [`invoice`] - Invoice document, text rendering, amount in words
//! - [`report`] - Sales statistics and GST summaries
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use spares_core::{compute_line_tax, amount_in_words, GstRate, Money};
//!
//! let tax = compute_line_tax(Money::from_rupees(100), 3, GstRate::Eighteen);
//! assert_eq!(tax.grand_total, Money::from_rupees(354));
//! assert_eq!(amount_in_words(tax.grand_total), "Three Hundred Fifty Four Rupees Only");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod money;
pub mod report;
pub mod sale;
pub mod store;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FailureKind, StoreError, ValidationError};
pub use invoice::{amount_in_words, InvoiceDocument};
pub use money::Money;
pub use sale::{checkout, execute_sale, Checkout, InvoiceStatus, SaleOutcome, SaleRequest};
pub use store::{Decrement, InventoryStore, SalesLedger, ShopDirectory};
pub use tax::{compute_line_tax, LineTax};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines accepted in one checkout.
pub const MAX_SALE_LINES: usize = 100;

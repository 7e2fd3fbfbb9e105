//! # GST Calculator
//!
//! Splits a line's GST into equal state and central halves.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Intra-state sale, GST slab r%                                          │
//! │                                                                         │
//! │    subtotal    = unit_price × quantity                                  │
//! │    sgst        = subtotal × r / 200        (state half)                 │
//! │    cgst        = sgst                      (central half)               │
//! │    total_gst   = sgst + cgst                                            │
//! │    grand_total = subtotal + total_gst  =  subtotal × (1 + r/100)        │
//! │                                                                         │
//! │  Example: ₹100 × 3 at 18%                                               │
//! │    subtotal 300, sgst 27, cgst 27, grand total 354                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every value is exact. Nothing is rounded here.

use rust_decimal::Decimal;
use serde::Serialize;
use ts_rs::TS;

use crate::money::Money;
use crate::types::GstRate;

/// Tax breakdown of one sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct LineTax {
    #[ts(type = "number")]
    pub subtotal: Money,
    #[ts(type = "number")]
    pub sgst: Money,
    #[ts(type = "number")]
    pub cgst: Money,
    #[ts(type = "number")]
    pub total_gst: Money,
    #[ts(type = "number")]
    pub grand_total: Money,
}

/// Computes the GST breakdown for `quantity` units at `unit_price`.
///
/// Total over its domain: the rate is always a valid slab and quantity
/// checks belong to the sale-line validator.
///
/// ```rust
/// use spares_core::money::Money;
/// use spares_core::tax::compute_line_tax;
/// use spares_core::types::GstRate;
///
/// let tax = compute_line_tax(Money::from_rupees(100), 3, GstRate::Eighteen);
/// assert_eq!(tax.sgst, Money::from_rupees(27));
/// assert_eq!(tax.grand_total, Money::from_rupees(354));
/// ```
pub fn compute_line_tax(unit_price: Money, quantity: i64, rate: GstRate) -> LineTax {
    let subtotal = unit_price * quantity;
    let sgst = Money::new(
        subtotal
            .amount()
            .saturating_mul(Decimal::from(rate.percent()))
            / Decimal::from(200),
    );
    let cgst = sgst;
    let total_gst = sgst + cgst;

    LineTax {
        subtotal,
        sgst,
        cgst,
        total_gst,
        grand_total: subtotal + total_gst,
    }
}

/// Like [`compute_line_tax`] but `None` when any amount of the line would
/// leave the decimal range. The sale executor runs this before touching
/// stock.
pub fn checked_line_tax(unit_price: Money, quantity: i64, rate: GstRate) -> Option<LineTax> {
    let subtotal = unit_price.checked_mul(quantity)?;
    let sgst = Money::new(
        subtotal
            .amount()
            .checked_mul(Decimal::from(rate.percent()))?
            .checked_div(Decimal::from(200))?,
    );
    let total_gst = sgst.checked_add(sgst)?;
    let grand_total = subtotal.checked_add(total_gst)?;

    Some(LineTax {
        subtotal,
        sgst,
        cgst: sgst,
        total_gst,
        grand_total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

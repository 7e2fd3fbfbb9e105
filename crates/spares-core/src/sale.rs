//! # Sale Transaction Engine
//!
//! Validates, decrements, taxes and records each line of a checkout.
//!
//! ## Per-Line Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    execute_sale(store, requester, request)              │
//! │                                                                         │
//! │  request checks ── customer name, invoice number, 1..=100 lines         │
//! │       │            (ValidationError: nothing touched yet)               │
//! │       ▼                                                                 │
//! │  for each line, independently:                                          │
//! │                                                                         │
//! │   get_part ──► validate_line ──► decrement_quantity ──► compute_line_tax│
//! │      │              │                   │                      │        │
//! │      │         Rejected(…)         Conflict ──► re-read,       ▼        │
//! │      │                              InsufficientStock    append_record  │
//! │      ▼                                                         │        │
//! │  PersistenceFailure                                   Committed(line)   │
//! │                                                                         │
//! │  A rejected or failed line never undoes an earlier committed line.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Per-Line?
//! A checkout is best-effort: the shop hands over whatever could be sold and
//! the result says exactly which lines made it. The outcome is a tagged list,
//! never a single pass/fail, so a partial invoice is visible as such.
//!
//! ## Stock Safety
//! `decrement_quantity` is a conditional update at the storage layer
//! (`... WHERE quantity_owned >= :n`). Two checkouts racing for the last
//! units cannot both win; the loser sees `InsufficientStock`. A line whose
//! amounts would overflow is rejected by `checked_line_tax` before the
//! decrement, so stock never moves for a sale that cannot be recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, FailureKind, StoreError, ValidationError};
use crate::invoice::InvoiceDocument;
use crate::money::Money;
use crate::store::{Decrement, InventoryStore, SalesLedger, ShopDirectory};
use crate::tax::{checked_line_tax, compute_line_tax, LineTax};
use crate::types::{GstRate, NewSaleRecord, Part, Requester};
use crate::validation::{validate_customer_name, validate_invoice_number};
use crate::MAX_SALE_LINES;

// =============================================================================
// Request
// =============================================================================

/// One requested line: sell `quantity` units of `part_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub part_id: String,
    pub quantity: i64,
}

/// A checkout as submitted by a shop.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRequest {
    pub customer_name: String,
    /// Shared by every record of this checkout.
    pub invoice_number: String,
    pub lines: Vec<SaleLine>,
}

// =============================================================================
// Line Validator
// =============================================================================

/// Why a line was not sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineRejection {
    #[error("Part not found or you do not own this part")]
    NotOwnedOrMissing,

    #[error("Invalid sell quantity: {requested}")]
    InvalidQuantity { requested: i64 },

    #[error("Sell quantity {requested} exceeds available quantity {available}")]
    InsufficientStock { available: i64, requested: i64 },

    /// Price × quantity, or its tax, does not fit in a money amount.
    #[error("Line amount out of range for quantity {requested}")]
    AmountOutOfRange { requested: i64 },

    /// Storage failed for this line. When `stock_decremented` is true the
    /// units left the shelf but no sales record was written.
    #[error("Could not complete sale line: {message}")]
    PersistenceFailure {
        message: String,
        stock_decremented: bool,
    },
}

impl LineRejection {
    /// Classifies the rejection for the caller.
    pub fn kind(&self) -> FailureKind {
        match self {
            LineRejection::InvalidQuantity { .. } | LineRejection::AmountOutOfRange { .. } => {
                FailureKind::Validation
            }
            LineRejection::NotOwnedOrMissing | LineRejection::InsufficientStock { .. } => {
                FailureKind::BusinessRule
            }
            LineRejection::PersistenceFailure { .. } => FailureKind::Persistence,
        }
    }
}

/// Checks one line against the current state of its part.
///
/// ## Order
/// 1. part exists and belongs to the requester, else `NotOwnedOrMissing`
/// 2. quantity is at least 1, else `InvalidQuantity`
/// 3. quantity fits in stock, else `InsufficientStock`
///
/// Pure. The executor calls it on a fresh read at commit time.
pub fn validate_line<'a>(
    part: Option<&'a Part>,
    requested_qty: i64,
    requester: &Requester,
) -> Result<&'a Part, LineRejection> {
    let part = match part {
        Some(part) if requester.owns(part) => part,
        _ => return Err(LineRejection::NotOwnedOrMissing),
    };

    if requested_qty < 1 {
        return Err(LineRejection::InvalidQuantity {
            requested: requested_qty,
        });
    }

    if requested_qty > part.quantity_owned {
        return Err(LineRejection::InsufficientStock {
            available: part.quantity_owned,
            requested: requested_qty,
        });
    }

    Ok(part)
}

// =============================================================================
// Outcome
// =============================================================================

/// A line that was sold and recorded.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct CommittedLine {
    /// Id of the sales history record.
    pub record_id: String,
    pub part_number: String,
    pub part_name: String,
    #[ts(type = "number")]
    pub unit_price: Money,
    #[ts(type = "number")]
    pub gst_rate: GstRate,
    pub tax: LineTax,
    /// Stock left after this line.
    pub remaining_quantity: i64,
}

/// What happened to one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineOutcome {
    Committed(CommittedLine),
    Rejected { reason: LineRejection },
}

/// Result for one requested line, in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineResult {
    /// 1-based position in the request.
    pub line_no: usize,
    pub part_id: String,
    pub requested_quantity: i64,
    #[serde(flatten)]
    pub outcome: LineOutcome,
    /// Human-readable rejection reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LineResult {
    fn new(line_no: usize, line: SaleLine, outcome: LineOutcome) -> Self {
        let message = match &outcome {
            LineOutcome::Committed(_) => None,
            LineOutcome::Rejected { reason } => Some(reason.to_string()),
        };
        LineResult {
            line_no,
            part_id: line.part_id,
            requested_quantity: line.quantity,
            outcome,
            message,
        }
    }

    /// The committed line, if this one was sold.
    pub fn committed(&self) -> Option<&CommittedLine> {
        match &self.outcome {
            LineOutcome::Committed(line) => Some(line),
            LineOutcome::Rejected { .. } => None,
        }
    }

    /// The rejection, if this one was not sold.
    pub fn rejection(&self) -> Option<&LineRejection> {
        match &self.outcome {
            LineOutcome::Committed(_) => None,
            LineOutcome::Rejected { reason } => Some(reason),
        }
    }
}

/// Overall state of an invoice after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Every line committed.
    Completed,
    /// Some lines committed, some did not.
    Partial,
    /// No line committed.
    Rejected,
}

/// Per-line results of one checkout plus the invoice total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleOutcome {
    pub invoice_number: String,
    pub customer_name: String,
    pub shop_email: String,
    pub sold_at: DateTime<Utc>,
    pub lines: Vec<LineResult>,
    /// Sum of committed lines' grand totals, exact.
    pub invoice_total: Money,
}

impl SaleOutcome {
    /// Committed lines in request order.
    pub fn committed_lines(&self) -> impl Iterator<Item = &CommittedLine> {
        self.lines.iter().filter_map(LineResult::committed)
    }

    pub fn committed_count(&self) -> usize {
        self.committed_lines().count()
    }

    pub fn rejected_count(&self) -> usize {
        self.lines.len() - self.committed_count()
    }

    pub fn status(&self) -> InvoiceStatus {
        match (self.committed_count(), self.rejected_count()) {
            (0, _) => InvoiceStatus::Rejected,
            (_, 0) => InvoiceStatus::Completed,
            _ => InvoiceStatus::Partial,
        }
    }

    /// The failure kind a caller should surface, `None` when fully sold.
    ///
    /// A mixed result is always `PartialInvoice`. A fully rejected invoice
    /// reports persistence if any line hit storage trouble, otherwise the
    /// kind of its first rejection.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.status() {
            InvoiceStatus::Completed => None,
            InvoiceStatus::Partial => Some(FailureKind::PartialInvoice),
            InvoiceStatus::Rejected => {
                let kinds: Vec<FailureKind> = self
                    .lines
                    .iter()
                    .filter_map(LineResult::rejection)
                    .map(LineRejection::kind)
                    .collect();
                if kinds.contains(&FailureKind::Persistence) {
                    Some(FailureKind::Persistence)
                } else {
                    kinds.first().copied()
                }
            }
        }
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Runs a checkout line by line.
///
/// Returns `Err` only for request-shape problems, before any line is
/// touched. Everything that goes wrong on a line is reported inside the
/// returned [`SaleOutcome`].
pub async fn execute_sale<S>(
    store: &S,
    requester: &Requester,
    request: SaleRequest,
) -> CoreResult<SaleOutcome>
where
    S: InventoryStore + SalesLedger + ?Sized,
{
    let customer_name = validate_customer_name(&request.customer_name)?;
    let invoice_number = validate_invoice_number(&request.invoice_number)?;

    if request.lines.is_empty() {
        return Err(ValidationError::required("lines").into());
    }
    if request.lines.len() > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        }
        .into());
    }

    let sold_at = Utc::now();
    let ctx = LineContext {
        requester,
        customer_name: &customer_name,
        invoice_number: &invoice_number,
        sold_at,
    };

    let mut lines = Vec::with_capacity(request.lines.len());
    let mut invoice_total = Money::zero();

    for (index, line) in request.lines.into_iter().enumerate() {
        let outcome = sell_line(store, &ctx, &line).await;
        if let LineOutcome::Committed(committed) = &outcome {
            invoice_total += committed.tax.grand_total;
        }
        lines.push(LineResult::new(index + 1, line, outcome));
    }

    let outcome = SaleOutcome {
        invoice_number,
        customer_name,
        shop_email: requester.email().to_string(),
        sold_at,
        lines,
        invoice_total,
    };

    info!(
        invoice = %outcome.invoice_number,
        shop = %outcome.shop_email,
        committed = outcome.committed_count(),
        rejected = outcome.rejected_count(),
        total = %outcome.invoice_total,
        "Sale executed"
    );

    Ok(outcome)
}

/// Output of [`checkout`]: the execution result and, when anything sold,
/// the invoice to hand the customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Checkout {
    pub status: InvoiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    pub outcome: SaleOutcome,
    pub invoice: Option<InvoiceDocument>,
}

/// Resolves the selling shop, executes the sale and formats the invoice.
///
/// An unknown shop fails before any stock moves.
pub async fn checkout<S>(store: &S, requester: &Requester, request: SaleRequest) -> CoreResult<Checkout>
where
    S: InventoryStore + SalesLedger + ShopDirectory + ?Sized,
{
    let shop = store
        .get_shop_by_email(requester.email())
        .await?
        .ok_or_else(|| CoreError::ShopNotFound(requester.email().to_string()))?;

    let outcome = execute_sale(store, requester, request).await?;
    let invoice = InvoiceDocument::from_outcome(&shop, &outcome);

    Ok(Checkout {
        status: outcome.status(),
        failure_kind: outcome.failure_kind(),
        outcome,
        invoice,
    })
}

// =============================================================================
// Line Processing
// =============================================================================

struct LineContext<'a> {
    requester: &'a Requester,
    customer_name: &'a str,
    invoice_number: &'a str,
    sold_at: DateTime<Utc>,
}

async fn sell_line<S>(store: &S, ctx: &LineContext<'_>, line: &SaleLine) -> LineOutcome
where
    S: InventoryStore + SalesLedger + ?Sized,
{
    let part = match store.get_part(&line.part_id).await {
        Ok(part) => part,
        Err(e) => return persistence_failure(line, e, false),
    };

    let checked = validate_line(part.as_ref(), line.quantity, ctx.requester).and_then(|part| {
        checked_line_tax(part.price, line.quantity, part.gst_rate)
            .map(|_| ())
            .ok_or(LineRejection::AmountOutOfRange {
                requested: line.quantity,
            })
    });
    if let Err(reason) = checked {
        warn!(part_id = %line.part_id, quantity = line.quantity, %reason, "Sale line rejected");
        return LineOutcome::Rejected { reason };
    }

    let updated = match store.decrement_quantity(&line.part_id, line.quantity).await {
        Ok(Decrement::Applied(part)) => part,
        Ok(Decrement::Conflict) => return lost_race(store, ctx, line).await,
        Err(e) => return persistence_failure(line, e, false),
    };

    let tax = compute_line_tax(updated.price, line.quantity, updated.gst_rate);
    let record = NewSaleRecord::snapshot(
        &updated,
        line.quantity,
        &tax,
        ctx.customer_name,
        ctx.invoice_number,
        ctx.sold_at,
    );

    match store.append_record(&record).await {
        Ok(record_id) => LineOutcome::Committed(CommittedLine {
            record_id,
            part_number: updated.part_number,
            part_name: updated.name,
            unit_price: updated.price,
            gst_rate: updated.gst_rate,
            tax,
            remaining_quantity: updated.quantity_owned,
        }),
        Err(e) => {
            error!(
                part_id = %line.part_id,
                quantity = line.quantity,
                invoice = %ctx.invoice_number,
                error = %e,
                "Stock decremented but sales record was not written"
            );
            LineOutcome::Rejected {
                reason: LineRejection::PersistenceFailure {
                    message: e.to_string(),
                    stock_decremented: true,
                },
            }
        }
    }
}

/// The conditional decrement found less stock than the earlier read.
/// Re-read so the rejection reports what is there now.
async fn lost_race<S>(store: &S, ctx: &LineContext<'_>, line: &SaleLine) -> LineOutcome
where
    S: InventoryStore + SalesLedger + ?Sized,
{
    let current = match store.get_part(&line.part_id).await {
        Ok(current) => current,
        Err(e) => return persistence_failure(line, e, false),
    };

    let reason = match validate_line(current.as_ref(), line.quantity, ctx.requester) {
        Err(reason) => reason,
        Ok(part) => LineRejection::InsufficientStock {
            available: part.quantity_owned,
            requested: line.quantity,
        },
    };

    warn!(part_id = %line.part_id, %reason, "Stock changed between check and decrement");
    LineOutcome::Rejected { reason }
}

fn persistence_failure(line: &SaleLine, err: StoreError, stock_decremented: bool) -> LineOutcome {
    error!(part_id = %line.part_id, error = %err, "Storage failure on sale line");
    LineOutcome::Rejected {
        reason: LineRejection::PersistenceFailure {
            message: err.to_string(),
            stock_decremented,
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Reports
//!
//! Aggregates over parts and sales records for the shop and admin views.
//! Money is summed in exact decimals here rather than in SQL, where the
//! TEXT-stored amounts would be coerced to floating point.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{GstRate, Part, SalesHistoryRecord};

// =============================================================================
// Sales Statistics
// =============================================================================

/// Lifetime sales figures of one shop.
#[derive(Debug, Clone, PartialEq, Default, Serialize, TS)]
#[ts(export)]
pub struct SalesStats {
    /// Number of ledger records (sold lines).
    pub total_sales: u64,
    pub total_items_sold: i64,
    /// Σ grand totals, GST included.
    #[ts(type = "number")]
    pub total_revenue: Money,
    #[ts(type = "number")]
    pub total_gst_collected: Money,
    /// Distinct customer names.
    pub total_customers: u64,
}

impl SalesStats {
    pub fn from_records(records: &[SalesHistoryRecord]) -> Self {
        let customers: HashSet<&str> = records.iter().map(|r| r.customer_name.as_str()).collect();

        SalesStats {
            total_sales: records.len() as u64,
            total_items_sold: records.iter().map(|r| r.quantity_sold).sum(),
            total_revenue: records.iter().map(|r| r.total_amount).sum(),
            total_gst_collected: records.iter().map(SalesHistoryRecord::gst_amount).sum(),
            total_customers: customers.len() as u64,
        }
    }
}

// =============================================================================
// GST Summary
// =============================================================================

/// Stock held at one GST slab.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct GstSummaryRow {
    #[ts(type = "number")]
    pub gst_rate: GstRate,
    pub part_count: u64,
    #[ts(type = "number")]
    pub total_inventory_value: Money,
}

/// Groups parts by GST slab, lowest slab first. Empty slabs are omitted.
pub fn gst_summary(parts: &[Part]) -> Vec<GstSummaryRow> {
    let mut by_rate: BTreeMap<GstRate, (u64, Money)> = BTreeMap::new();
    for part in parts {
        let entry = by_rate.entry(part.gst_rate).or_default();
        entry.0 += 1;
        entry.1 += part.inventory_value();
    }

    by_rate
        .into_iter()
        .map(|(gst_rate, (part_count, total_inventory_value))| GstSummaryRow {
            gst_rate,
            part_count,
            total_inventory_value,
        })
        .collect()
}

/// Σ price × quantity over `parts`.
pub fn inventory_value(parts: &[Part]) -> Money {
    parts.iter().map(Part::inventory_value).sum()
}

// =============================================================================
// Admin Dashboard
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_parts: u64,
    pub gst_registered_users: u64,
    #[ts(type = "number")]
    pub total_inventory_value: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

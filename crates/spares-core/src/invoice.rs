//! # Invoice Formatter
//!
//! Turns committed sale lines plus shop metadata into a B2C tax invoice.
//!
//! ## Data In, Document Out
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ShopOwner ─────┐                                                       │
//! │                 ├──► InvoiceDocument ──► Display (plain-text invoice)   │
//! │  SaleOutcome ───┘        │                                              │
//! │   (fresh checkout)       ├── rows: committed lines only                 │
//! │                          ├── subtotal / SGST / CGST / grand total       │
//! │  SalesHistoryRecord[] ───┘   └── amount_in_words(grand total)           │
//! │   (reprint from ledger)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Indian Numbering
//! `amount_in_words` groups digits 3, 2, 2 from the right:
//! ```text
//!   1,50,000   ──►  [1] Lakh  [50] Thousand  [000]
//!              ──►  "One Lakh Fifty Thousand Rupees Only"
//! ```
//! Anything from one hundred crore upward repeats the scheme on the crore
//! count ("One Hundred Crore").

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::sale::SaleOutcome;
use crate::types::{GstRate, SalesHistoryRecord, ShopOwner};

/// Heading printed on every invoice.
pub const INVOICE_TITLE: &str = "Tax Invoice (B2C)";

/// Closing lines printed under the totals.
pub const INVOICE_TERMS: [&str; 4] = [
    "Terms & Conditions:",
    "1. Goods once sold will not be taken back or exchanged.",
    "2. Warranty claims must be made with original invoice.",
    "3. All disputes subject to local jurisdiction only.",
];

const WIDTH: usize = 92;

// =============================================================================
// Document
// =============================================================================

/// Seller block of the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct InvoiceShop {
    pub shop_name: String,
    pub shop_location: String,
    pub phone: String,
    pub gst_number: Option<String>,
    pub email: String,
}

impl From<&ShopOwner> for InvoiceShop {
    fn from(shop: &ShopOwner) -> Self {
        InvoiceShop {
            shop_name: shop.shop_name.clone(),
            shop_location: shop.shop_location.clone(),
            phone: shop.phone.clone(),
            gst_number: shop.gst_number.clone().filter(|g| !g.trim().is_empty()),
            email: shop.email.clone(),
        }
    }
}

/// One printed line.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct InvoiceRow {
    pub line_no: usize,
    pub part_number: String,
    pub part_name: String,
    pub quantity: i64,
    #[ts(type = "number")]
    pub unit_price: Money,
    #[ts(type = "number")]
    pub gst_rate: GstRate,
    #[ts(type = "number")]
    pub cgst: Money,
    #[ts(type = "number")]
    pub sgst: Money,
    /// Line grand total including GST.
    #[ts(type = "number")]
    pub total: Money,
}

/// A rendered-ready invoice. Amounts are exact; `Display` rounds them.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct InvoiceDocument {
    pub title: String,
    pub invoice_number: String,
    pub customer_name: String,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub shop: InvoiceShop,
    pub rows: Vec<InvoiceRow>,
    #[ts(type = "number")]
    pub subtotal: Money,
    #[ts(type = "number")]
    pub total_cgst: Money,
    #[ts(type = "number")]
    pub total_sgst: Money,
    #[ts(type = "number")]
    pub grand_total: Money,
    pub amount_in_words: String,
}

impl InvoiceDocument {
    /// Builds the invoice for a fresh checkout. `None` when nothing sold.
    pub fn from_outcome(shop: &ShopOwner, outcome: &SaleOutcome) -> Option<Self> {
        let rows: Vec<InvoiceRow> = outcome
            .lines
            .iter()
            .filter_map(|result| result.committed().map(|line| (result.requested_quantity, line)))
            .enumerate()
            .map(|(index, (quantity, line))| InvoiceRow {
                line_no: index + 1,
                part_number: line.part_number.clone(),
                part_name: line.part_name.clone(),
                quantity,
                unit_price: line.unit_price,
                gst_rate: line.gst_rate,
                cgst: line.tax.cgst,
                sgst: line.tax.sgst,
                total: line.tax.grand_total,
            })
            .collect();

        Self::assemble(
            shop,
            &outcome.invoice_number,
            &outcome.customer_name,
            outcome.sold_at,
            rows,
        )
    }

    /// Rebuilds an invoice from its ledger records. `None` when empty.
    pub fn from_records(shop: &ShopOwner, records: &[SalesHistoryRecord]) -> Option<Self> {
        let first = records.first()?;
        let issued_at = records
            .iter()
            .map(|r| r.sale_date)
            .min()
            .unwrap_or(first.sale_date);

        let rows = records
            .iter()
            .enumerate()
            .map(|(index, record)| InvoiceRow {
                line_no: index + 1,
                part_number: record.part_number.clone(),
                part_name: record.part_name.clone(),
                quantity: record.quantity_sold,
                unit_price: record.selling_price,
                gst_rate: record.gst_rate,
                cgst: record.cgst_amount,
                sgst: record.sgst_amount,
                total: record.total_amount,
            })
            .collect();

        Self::assemble(
            shop,
            &first.invoice_number,
            &first.customer_name,
            issued_at,
            rows,
        )
    }

    fn assemble(
        shop: &ShopOwner,
        invoice_number: &str,
        customer_name: &str,
        issued_at: DateTime<Utc>,
        rows: Vec<InvoiceRow>,
    ) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let total_cgst: Money = rows.iter().map(|r| r.cgst).sum();
        let total_sgst: Money = rows.iter().map(|r| r.sgst).sum();
        let grand_total: Money = rows.iter().map(|r| r.total).sum();
        let subtotal = grand_total - total_cgst - total_sgst;

        Some(InvoiceDocument {
            title: INVOICE_TITLE.to_string(),
            invoice_number: invoice_number.to_string(),
            customer_name: customer_name.to_string(),
            issued_at,
            shop: InvoiceShop::from(shop),
            rows,
            subtotal,
            total_cgst,
            total_sgst,
            grand_total,
            amount_in_words: amount_in_words(grand_total),
        })
    }
}

/// Plain-text rendering, one invoice per call.
impl fmt::Display for InvoiceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(WIDTH);

        writeln!(f, "{:^WIDTH$}", self.shop.shop_name.to_uppercase())?;
        writeln!(f, "{:^WIDTH$}", self.shop.shop_location)?;
        if let Some(gstin) = &self.shop.gst_number {
            writeln!(f, "{:^WIDTH$}", format!("GSTIN: {gstin}"))?;
        }
        writeln!(f, "{:^WIDTH$}", format!("Phone: {}", self.shop.phone))?;
        writeln!(f, "{rule}")?;

        let customer = format!("Customer: {}", self.customer_name);
        writeln!(f, "{customer:<60}{:>32}", self.title)?;
        writeln!(
            f,
            "Date: {}  Time: {}",
            self.issued_at.format("%d-%m-%Y"),
            self.issued_at.format("%H:%M:%S")
        )?;
        writeln!(f, "Invoice No: {}", self.invoice_number)?;
        writeln!(f, "{rule}")?;

        writeln!(
            f,
            "{:<14} {:<24} {:>5} {:>10} {:>5} {:>9} {:>9} {:>10}",
            "Part No", "Part Name", "Qty", "Price", "GST", "CGST", "SGST", "Total"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<14} {:<24} {:>5} {:>10} {:>5} {:>9} {:>9} {:>10}",
                clip(&row.part_number, 14),
                clip(&row.part_name, 24),
                row.quantity,
                row.unit_price.to_string(),
                row.gst_rate.to_string(),
                row.cgst.to_string(),
                row.sgst.to_string(),
                row.total.to_string(),
            )?;
        }
        writeln!(f, "{rule}")?;

        writeln!(f, "{:>78} {:>13}", "Subtotal:", self.subtotal.to_string())?;
        writeln!(f, "{:>78} {:>13}", "CGST:", self.total_cgst.to_string())?;
        writeln!(f, "{:>78} {:>13}", "SGST:", self.total_sgst.to_string())?;
        writeln!(f, "{:>78} {:>13}", "Grand Total:", self.grand_total.to_string())?;
        writeln!(f)?;
        writeln!(f, "Amount in Words: {}", self.amount_in_words)?;
        writeln!(f)?;
        writeln!(f, "Thank you for your business!")?;
        writeln!(f)?;
        for term in INVOICE_TERMS {
            writeln!(f, "{term}")?;
        }
        Ok(())
    }
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(max - 1).collect();
        clipped.push('~');
        clipped
    }
}

// =============================================================================
// Amount in Words
// =============================================================================

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen",
    "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Spells a rupee amount the Indian way. Paise are dropped.
///
/// ```rust
/// use spares_core::invoice::amount_in_words;
/// use spares_core::money::Money;
///
/// assert_eq!(
///     amount_in_words(Money::from_rupees(150000)),
///     "One Lakh Fifty Thousand Rupees Only"
/// );
/// ```
pub fn amount_in_words(amount: Money) -> String {
    match amount.whole_rupees() {
        0 => "Zero Rupees Only".to_string(),
        rupees => format!("{} Rupees Only", integer_in_words(rupees)),
    }
}

fn integer_in_words(n: u64) -> String {
    let crore = n / 10_000_000;
    let rest = n % 10_000_000;

    let lakh = rest / 100_000;
    let thousand = (rest / 1_000) % 100;
    let hundreds = rest % 1_000;

    let mut words = Vec::new();
    if crore > 0 {
        words.push(format!("{} Crore", integer_in_words(crore)));
    }
    if lakh > 0 {
        words.push(format!("{} Lakh", below_hundred(lakh)));
    }
    if thousand > 0 {
        words.push(format!("{} Thousand", below_hundred(thousand)));
    }
    if hundreds > 0 {
        words.push(below_thousand(hundreds));
    }
    words.join(" ")
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    match (hundreds, rest) {
        (0, _) => below_hundred(rest),
        (h, 0) => format!("{} Hundred", ONES[h as usize]),
        (h, r) => format!("{} Hundred {}", ONES[h as usize], below_hundred(r)),
    }
}

fn below_hundred(n: u64) -> String {
    let n = n as usize;
    match n {
        0..=19 => ONES[n].to_string(),
        _ if n % 10 == 0 => TENS[n / 10].to_string(),
        _ => format!("{} {}", TENS[n / 10], ONES[n % 10]),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sale::{CommittedLine, LineOutcome, LineRejection, LineResult};
    use crate::tax::compute_line_tax;

    fn shop() -> ShopOwner {
        let now = Utc::now();
        ShopOwner {
            id: "S1".into(),
            email: "shop@example.com".into(),
            owner_name: "Ravi Kumar".into(),
            shop_name: "Ravi Auto Spares".into(),
            shop_location: "MG Road, Pune".into(),
            phone: "9876543210".into(),
            gst_number: Some("27ABCDE1234F1Z5".into()),
            password_hash: "hash".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn record(id: &str, qty: i64, price: i64, rate: GstRate) -> SalesHistoryRecord {
        let tax = compute_line_tax(Money::from_rupees(price), qty, rate);
        SalesHistoryRecord {
            id: id.into(),
            part_id: format!("P-{id}"),
            part_number: format!("PN-{id}"),
            part_name: format!("Part {id}"),
            customer_name: "Anil".into(),
            quantity_sold: qty,
            selling_price: Money::from_rupees(price),
            total_amount: tax.grand_total,
            gst_rate: rate,
            sgst_amount: tax.sgst,
            cgst_amount: tax.cgst,
            shop_email: "shop@example.com".into(),
            invoice_number: "INV-1-ABCDE".into(),
            sale_date: Utc::now(),
        }
    }

    #[test]
    fn test_words_reference_values() {
        assert_eq!(
            amount_in_words(Money::from_rupees(354)),
            "Three Hundred Fifty Four Rupees Only"
        );
        assert_eq!(
            amount_in_words(Money::from_rupees(150_000)),
            "One Lakh Fifty Thousand Rupees Only"
        );
    }

    #[test]
    fn test_words_group_boundaries() {
        let cases = [
            (0, "Zero Rupees Only"),
            (7, "Seven Rupees Only"),
            (19, "Nineteen Rupees Only"),
            (40, "Forty Rupees Only"),
            (100, "One Hundred Rupees Only"),
            (1_005, "One Thousand Five Rupees Only"),
            (99_999, "Ninety Nine Thousand Nine Hundred Ninety Nine Rupees Only"),
            (1_00_000, "One Lakh Rupees Only"),
            (1_00_00_000, "One Crore Rupees Only"),
            (
                1_23_45_678,
                "One Crore Twenty Three Lakh Forty Five Thousand Six Hundred Seventy Eight Rupees Only",
            ),
            (100_00_00_000, "One Hundred Crore Rupees Only"),
        ];
        for (rupees, expected) in cases {
            assert_eq!(amount_in_words(Money::from_rupees(rupees)), expected);
        }
    }

    #[test]
    fn test_words_truncate_paise() {
        assert_eq!(
            amount_in_words(Money::from_paise(35499)),
            "Three Hundred Fifty Four Rupees Only"
        );
        assert_eq!(amount_in_words(Money::from_paise(99)), "Zero Rupees Only");
    }

    #[test]
    fn test_from_records_totals() {
        let records = vec![
            record("R1", 3, 100, GstRate::Eighteen),
            record("R2", 2, 50, GstRate::Zero),
        ];
        let doc = InvoiceDocument::from_records(&shop(), &records).unwrap();

        assert_eq!(doc.rows.len(), 2);
        assert_eq!(doc.subtotal, Money::from_rupees(400));
        assert_eq!(doc.total_cgst, Money::from_rupees(27));
        assert_eq!(doc.total_sgst, Money::from_rupees(27));
        assert_eq!(doc.grand_total, Money::from_rupees(454));
        assert_eq!(doc.amount_in_words, "Four Hundred Fifty Four Rupees Only");
        assert!(InvoiceDocument::from_records(&shop(), &[]).is_none());
    }

    #[test]
    fn test_from_outcome_skips_rejected_lines() {
        let tax = compute_line_tax(Money::from_rupees(100), 3, GstRate::Eighteen);
        let outcome = SaleOutcome {
            invoice_number: "INV-1-ABCDE".into(),
            customer_name: "Anil".into(),
            shop_email: "shop@example.com".into(),
            sold_at: Utc::now(),
            lines: vec![
                LineResult {
                    line_no: 1,
                    part_id: "P9".into(),
                    requested_quantity: 2,
                    outcome: LineOutcome::Rejected {
                        reason: LineRejection::NotOwnedOrMissing,
                    },
                    message: None,
                },
                LineResult {
                    line_no: 2,
                    part_id: "P1".into(),
                    requested_quantity: 3,
                    outcome: LineOutcome::Committed(CommittedLine {
                        record_id: "R1".into(),
                        part_number: "BRK-001".into(),
                        part_name: "Brake Pad".into(),
                        unit_price: Money::from_rupees(100),
                        gst_rate: GstRate::Eighteen,
                        tax,
                        remaining_quantity: 7,
                    }),
                    message: None,
                },
            ],
            invoice_total: tax.grand_total,
        };

        let doc = InvoiceDocument::from_outcome(&shop(), &outcome).unwrap();
        assert_eq!(doc.rows.len(), 1);
        assert_eq!(doc.rows[0].line_no, 1);
        assert_eq!(doc.rows[0].quantity, 3);
        assert_eq!(doc.grand_total, outcome.invoice_total);
    }

    #[test]
    fn test_text_rendering() {
        let doc = InvoiceDocument::from_records(&shop(), &[record("R1", 3, 100, GstRate::Eighteen)])
            .unwrap();
        let text = doc.to_string();

        assert!(text.contains("RAVI AUTO SPARES"));
        assert!(text.contains("GSTIN: 27ABCDE1234F1Z5"));
        assert!(text.contains("Phone: 9876543210"));
        assert!(text.contains("Tax Invoice (B2C)"));
        assert!(text.contains("Invoice No: INV-1-ABCDE"));
        assert!(text.contains("₹354.00"));
        assert!(text.contains("Amount in Words: Three Hundred Fifty Four Rupees Only"));
        assert!(text.contains("Thank you for your business!"));
        assert!(text.contains("3. All disputes subject to local jurisdiction only."));
    }

    #[test]
    fn test_clip_long_names() {
        assert_eq!(clip("Brake", 10), "Brake");
        assert_eq!(clip("Front Brake Pad Set", 10), "Front Bra~");
    }
}

//! # Domain Types
//!
//! Core domain types used throughout Spares POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │   ShopOwner     │   │      Part       │   │  SalesHistoryRecord  │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  email (unique) │◄──│  owner_email    │   │  part_id (snapshot)  │  │
//! │  │  shop_name      │   │  part_number    │   │  part_name           │  │
//! │  │  gst_number?    │   │  price          │   │  selling_price       │  │
//! │  │  password_hash  │   │  quantity_owned │   │  sgst / cgst         │  │
//! │  └─────────────────┘   │  gst_rate       │   │  invoice_number      │  │
//! │                        └─────────────────┘   └──────────────────────┘  │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    GstRate      │   │   Requester     │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  0|5|12|18|28   │   │  email          │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Records
//! A `SalesHistoryRecord` copies part number, name and price at sale time.
//! Editing or deleting the part later never changes an issued invoice.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::tax::LineTax;
use crate::validation::GstRateInput;

// =============================================================================
// GST Rate
// =============================================================================

/// GST slab applied to a part, in percent.
///
/// Only the five statutory slabs exist. An out-of-set rate cannot be
/// represented, so the tax calculator never has to reject one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GstRate {
    Zero,
    Five,
    Twelve,
    Eighteen,
    TwentyEight,
}

impl GstRate {
    /// All slabs in ascending order.
    pub const ALL: [GstRate; 5] = [
        GstRate::Zero,
        GstRate::Five,
        GstRate::Twelve,
        GstRate::Eighteen,
        GstRate::TwentyEight,
    ];

    /// The rate used when a client sends nothing usable.
    pub const DEFAULT: GstRate = GstRate::Eighteen;

    /// Returns the slab as a whole percentage.
    pub const fn percent(self) -> u8 {
        match self {
            GstRate::Zero => 0,
            GstRate::Five => 5,
            GstRate::Twelve => 12,
            GstRate::Eighteen => 18,
            GstRate::TwentyEight => 28,
        }
    }

    /// Looks up a slab by percentage.
    pub fn from_percent(percent: i64) -> Option<Self> {
        GstRate::ALL
            .into_iter()
            .find(|rate| i64::from(rate.percent()) == percent)
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate::DEFAULT
    }
}

impl fmt::Display for GstRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

impl Serialize for GstRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.percent())
    }
}

/// Strict: only the five slabs deserialize. Lenient coercion to 18 is a
/// request-layer concern, see [`crate::validation::coerce_gst_rate`].
impl<'de> Deserialize<'de> for GstRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = GstRateInput::deserialize(deserializer)?;
        raw.to_slab()
            .ok_or_else(|| de::Error::custom("GST rate must be one of 0, 5, 12, 18, 28"))
    }
}

// =============================================================================
// Requester
// =============================================================================

/// The shop owner on whose behalf a call is made.
///
/// Identity is always passed explicitly into core calls. There is no
/// ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    email: String,
}

impl Requester {
    /// Builds a requester from a claimed email.
    pub fn new(email: impl AsRef<str>) -> Result<Self, ValidationError> {
        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(ValidationError::required("requester email"));
        }
        Ok(Requester {
            email: email.to_string(),
        })
    }

    /// The requester's email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether this requester owns the part.
    pub fn owns(&self, part: &Part) -> bool {
        part.owner_email == self.email
    }
}

// =============================================================================
// Part
// =============================================================================

/// A spare part listed by one shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Part {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Email of the owning shop.
    pub owner_email: String,

    /// Shop-scoped catalog code, not globally unique.
    pub part_number: String,

    pub name: String,
    pub description: String,

    /// Selling price per unit.
    #[ts(type = "number")]
    pub price: Money,

    /// MRP / purchase reference price. Expected to be at least `price`.
    #[ts(type = "number")]
    pub original_price: Money,

    /// Units in stock. Never negative.
    pub quantity_owned: i64,

    #[ts(type = "number")]
    pub gst_rate: GstRate,

    /// 4 to 8 digit HSN classification code.
    pub hsn_code: Option<String>,

    /// Image URL or path. Storage is handled outside this system.
    pub image: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Part {
    /// Builds a new part from validated owner input.
    pub fn from_draft(
        id: impl Into<String>,
        owner_email: impl Into<String>,
        draft: PartDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Part {
            id: id.into(),
            owner_email: owner_email.into(),
            part_number: draft.part_number,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            original_price: draft.original_price,
            quantity_owned: draft.quantity_owned,
            gst_rate: draft.gst_rate,
            hsn_code: draft.hsn_code,
            image: draft.image,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an owner edit. The image is only replaced when one is given.
    pub fn apply_draft(&mut self, draft: PartDraft, now: DateTime<Utc>) {
        self.part_number = draft.part_number;
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.original_price = draft.original_price;
        self.quantity_owned = draft.quantity_owned;
        self.gst_rate = draft.gst_rate;
        self.hsn_code = draft.hsn_code;
        if draft.image.is_some() {
            self.image = draft.image;
        }
        self.updated_at = now;
    }

    /// Stock value at selling price (price × quantity).
    pub fn inventory_value(&self) -> Money {
        self.price * self.quantity_owned
    }
}

/// Validated owner input for creating or editing a part.
///
/// Built by [`crate::validation::validate_part_draft`]; every field here has
/// already passed its rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PartDraft {
    pub part_number: String,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub original_price: Money,
    pub quantity_owned: i64,
    pub gst_rate: GstRate,
    pub hsn_code: Option<String>,
    pub image: Option<String>,
}

// =============================================================================
// Shop Owner
// =============================================================================

/// A registered shop. Holds the password hash, so it never goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopOwner {
    pub id: String,
    pub email: String,
    pub owner_name: String,
    pub shop_name: String,
    pub shop_location: String,
    pub phone: String,
    /// The shop's own GSTIN, if registered.
    pub gst_number: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShopOwner {
    /// Whether the shop has a GSTIN on file.
    pub fn is_gst_registered(&self) -> bool {
        self.gst_number
            .as_deref()
            .is_some_and(|gstin| !gstin.trim().is_empty())
    }

    /// Public view of the shop.
    pub fn profile(&self) -> ShopProfile {
        ShopProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            owner_name: self.owner_name.clone(),
            shop_name: self.shop_name.clone(),
            shop_location: self.shop_location.clone(),
            phone: self.phone.clone(),
            gst_number: self.gst_number.clone(),
            gst_status: if self.is_gst_registered() {
                GstStatus::Registered
            } else {
                GstStatus::NotRegistered
            },
            created_at: self.created_at,
        }
    }
}

/// Whether a shop has a GSTIN on file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum GstStatus {
    Registered,
    #[serde(rename = "Not Registered")]
    NotRegistered,
}

/// Shop data safe to return to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShopProfile {
    pub id: String,
    pub email: String,
    pub owner_name: String,
    pub shop_name: String,
    pub shop_location: String,
    pub phone: String,
    pub gst_number: Option<String>,
    pub gst_status: GstStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sales History
// =============================================================================

/// One sold line of one invoice. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesHistoryRecord {
    pub id: String,
    pub part_id: String,
    pub part_number: String,
    pub part_name: String,
    pub customer_name: String,
    pub quantity_sold: i64,
    /// Unit price at sale time.
    #[ts(type = "number")]
    pub selling_price: Money,
    /// Line grand total including GST.
    #[ts(type = "number")]
    pub total_amount: Money,
    #[ts(type = "number")]
    pub gst_rate: GstRate,
    #[ts(type = "number")]
    pub sgst_amount: Money,
    #[ts(type = "number")]
    pub cgst_amount: Money,
    pub shop_email: String,
    pub invoice_number: String,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
}

impl SalesHistoryRecord {
    /// Attaches the ledger id to a new record.
    pub fn from_new(id: impl Into<String>, record: NewSaleRecord) -> Self {
        SalesHistoryRecord {
            id: id.into(),
            part_id: record.part_id,
            part_number: record.part_number,
            part_name: record.part_name,
            customer_name: record.customer_name,
            quantity_sold: record.quantity_sold,
            selling_price: record.selling_price,
            total_amount: record.total_amount,
            gst_rate: record.gst_rate,
            sgst_amount: record.sgst_amount,
            cgst_amount: record.cgst_amount,
            shop_email: record.shop_email,
            invoice_number: record.invoice_number,
            sale_date: record.sale_date,
        }
    }

    /// Pre-tax line amount.
    pub fn subtotal(&self) -> Money {
        self.selling_price * self.quantity_sold
    }

    /// SGST plus CGST.
    pub fn gst_amount(&self) -> Money {
        self.sgst_amount + self.cgst_amount
    }
}

/// A sale record before the ledger assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSaleRecord {
    pub part_id: String,
    pub part_number: String,
    pub part_name: String,
    pub customer_name: String,
    pub quantity_sold: i64,
    pub selling_price: Money,
    pub total_amount: Money,
    pub gst_rate: GstRate,
    pub sgst_amount: Money,
    pub cgst_amount: Money,
    pub shop_email: String,
    pub invoice_number: String,
    pub sale_date: DateTime<Utc>,
}

impl NewSaleRecord {
    /// Snapshots a part as it stood when its stock was decremented.
    pub fn snapshot(
        part: &Part,
        quantity: i64,
        tax: &LineTax,
        customer_name: &str,
        invoice_number: &str,
        sale_date: DateTime<Utc>,
    ) -> Self {
        NewSaleRecord {
            part_id: part.id.clone(),
            part_number: part.part_number.clone(),
            part_name: part.name.clone(),
            customer_name: customer_name.to_string(),
            quantity_sold: quantity,
            selling_price: part.price,
            total_amount: tax.grand_total,
            gst_rate: part.gst_rate,
            sgst_amount: tax.sgst,
            cgst_amount: tax.cgst,
            shop_email: part.owner_email.clone(),
            invoice_number: invoice_number.to_string(),
            sale_date,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

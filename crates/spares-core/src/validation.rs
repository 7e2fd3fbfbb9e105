//! # Validation Module
//!
//! Input validation utilities for Spares POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (apps/server)                                 │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── Requester header present                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Field rules (email, phone, GSTIN, HSN, prices)                    │
//! │  └── GST slab coercion (anything unknown becomes 18%)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity_owned >= 0), CHECK (gst_rate IN (...))            │
//! │  └── UNIQUE (email), append-only triggers on sales_history             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sale-line rules (ownership, quantity, stock) live in [`crate::sale`]
//! because they produce per-line rejections, not request errors.

use serde::Deserialize;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{GstRate, PartDraft};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length for shop owners.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest accepted customer name on an invoice.
pub const MAX_CUSTOMER_NAME_LEN: usize = 100;

/// Longest accepted invoice number.
pub const MAX_INVOICE_NUMBER_LEN: usize = 64;

/// Highest unit price a part may carry, in rupees (one crore).
pub const MAX_PART_PRICE_RUPEES: i64 = 10_000_000;

/// Highest stock level a part may carry.
pub const MAX_QUANTITY_OWNED: i64 = 1_000_000;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

static GSTIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("static regex")
});

static HSN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4,8}$").expect("static regex"));

// =============================================================================
// GST Rate Coercion
// =============================================================================

/// A GST rate as clients send it: a number (`18`) or a string (`"18"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GstRateInput {
    Number(f64),
    Text(String),
}

impl GstRateInput {
    /// The slab this input names exactly, if any.
    pub fn to_slab(&self) -> Option<GstRate> {
        match self {
            GstRateInput::Number(n) if n.fract() == 0.0 => GstRate::from_percent(*n as i64),
            GstRateInput::Number(_) => None,
            GstRateInput::Text(s) => s.trim().parse::<i64>().ok().and_then(GstRate::from_percent),
        }
    }
}

/// Maps client input onto a GST slab. Missing or unknown values become 18%.
///
/// ## Example
/// ```rust
/// use spares_core::validation::{coerce_gst_rate, GstRateInput};
/// use spares_core::types::GstRate;
///
/// assert_eq!(coerce_gst_rate(Some(&GstRateInput::Text("5".into()))), GstRate::Five);
/// assert_eq!(coerce_gst_rate(Some(&GstRateInput::Number(7.0))), GstRate::Eighteen);
/// assert_eq!(coerce_gst_rate(None), GstRate::Eighteen);
/// ```
pub fn coerce_gst_rate(input: Option<&GstRateInput>) -> GstRate {
    input.and_then(GstRateInput::to_slab).unwrap_or(GstRate::DEFAULT)
}

// =============================================================================
// String Validators
// =============================================================================

/// Trims a required text field and enforces a maximum length.
pub fn validate_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<String> {
    let value = value.map(str::trim).unwrap_or_default();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates an email address (something@domain.tld, no whitespace).
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = validate_text("email", Some(email), 254)?;
    if !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::invalid("email", "expected name@domain.tld"));
    }
    Ok(email)
}

/// Validates an Indian mobile number: exactly 10 digits.
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let phone = validate_text("phone", Some(phone), 10)?;
    if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid("phone", "must be exactly 10 digits"));
    }
    Ok(phone)
}

/// Validates a password (length only; hashing is the caller's job).
pub fn validate_password(field: &str, password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required(field));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Checks a GSTIN against the 15-character structure.
///
/// ```rust
/// use spares_core::validation::is_valid_gstin;
///
/// assert!(is_valid_gstin("27ABCDE1234F1Z5"));
/// assert!(!is_valid_gstin("27abcde1234f1z5"));
/// ```
pub fn is_valid_gstin(gstin: &str) -> bool {
    GSTIN_RE.is_match(gstin.trim())
}

/// Validates a required GSTIN.
pub fn validate_gstin(gstin: &str) -> ValidationResult<String> {
    let gstin = validate_text("gst_number", Some(gstin), 15)?;
    if !is_valid_gstin(&gstin) {
        return Err(ValidationError::invalid("gst_number", "invalid GSTIN format"));
    }
    Ok(gstin)
}

/// Validates an optional GSTIN. Blank input means "not registered".
pub fn validate_optional_gstin(gstin: Option<&str>) -> ValidationResult<Option<String>> {
    match gstin.map(str::trim) {
        None | Some("") => Ok(None),
        Some(gstin) => validate_gstin(gstin).map(Some),
    }
}

/// Validates an optional HSN code (4 to 8 digits). Blank means none.
pub fn validate_hsn_code(hsn: Option<&str>) -> ValidationResult<Option<String>> {
    match hsn.map(str::trim) {
        None | Some("") => Ok(None),
        Some(hsn) if HSN_RE.is_match(hsn) => Ok(Some(hsn.to_string())),
        Some(_) => Err(ValidationError::invalid("hsn_code", "HSN code must be 4-8 digits")),
    }
}

/// Validates a customer name for an invoice.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    validate_text("customer_name", Some(name), MAX_CUSTOMER_NAME_LEN)
}

/// Validates a caller-supplied invoice number.
pub fn validate_invoice_number(invoice_number: &str) -> ValidationResult<String> {
    validate_text("invoice_number", Some(invoice_number), MAX_INVOICE_NUMBER_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price: present, not negative, at most
/// [`MAX_PART_PRICE_RUPEES`].
pub fn validate_price(field: &str, price: Option<Money>) -> ValidationResult<Money> {
    let price = price.ok_or_else(|| ValidationError::required(field))?;
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if price > Money::from_rupees(MAX_PART_PRICE_RUPEES) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PART_PRICE_RUPEES,
        });
    }
    Ok(price)
}

/// Validates a stock level set by the owner.
///
/// With the price cap, price × stock × 1.28 stays far inside the money
/// range, so no sale line or inventory total can overflow.
pub fn validate_quantity_owned(quantity: i64) -> ValidationResult<i64> {
    if quantity < 0 {
        return Err(ValidationError::Negative {
            field: "quantity_owned".to_string(),
        });
    }
    if quantity > MAX_QUANTITY_OWNED {
        return Err(ValidationError::OutOfRange {
            field: "quantity_owned".to_string(),
            min: 0,
            max: MAX_QUANTITY_OWNED,
        });
    }
    Ok(quantity)
}

// =============================================================================
// Part Input
// =============================================================================

/// Owner input for adding or editing a part, as it arrives on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartInput {
    pub part_number: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    #[serde(alias = "originalPrice")]
    pub original_price: Option<Money>,
    pub quantity_owned: Option<i64>,
    pub gst_rate: Option<GstRateInput>,
    pub hsn_code: Option<String>,
    pub image: Option<String>,
}

/// Validates part input into a [`PartDraft`].
///
/// ## Rules
/// - part number, name, description, price and original price are required
/// - prices and quantity must not be negative or above their caps;
///   quantity defaults to 1
/// - GST is coerced to a slab, HSN must be 4 to 8 digits when given
pub fn validate_part_draft(input: PartInput) -> ValidationResult<PartDraft> {
    Ok(PartDraft {
        part_number: validate_text("part_number", input.part_number.as_deref(), 50)?,
        name: validate_text("name", input.name.as_deref(), 200)?,
        description: validate_text("description", input.description.as_deref(), 2000)?,
        price: validate_price("price", input.price)?,
        original_price: validate_price("original_price", input.original_price)?,
        quantity_owned: validate_quantity_owned(input.quantity_owned.unwrap_or(1))?,
        gst_rate: coerce_gst_rate(input.gst_rate.as_ref()),
        hsn_code: validate_hsn_code(input.hsn_code.as_deref())?,
        image: input
            .image
            .map(|image| image.trim().to_string())
            .filter(|image| !image.is_empty()),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn part_input() -> PartInput {
        PartInput {
            part_number: Some("SPK-220".into()),
            name: Some("Spark Plug".into()),
            description: Some("Iridium spark plug".into()),
            price: Some(Money::from_rupees(250)),
            original_price: Some(Money::from_rupees(300)),
            quantity_owned: Some(12),
            gst_rate: Some(GstRateInput::Text("28".into())),
            hsn_code: Some("8511".into()),
            image: None,
        }
    }

    #[test]
    fn test_gst_coercion() {
        assert_eq!(coerce_gst_rate(Some(&GstRateInput::Number(12.0))), GstRate::Twelve);
        assert_eq!(coerce_gst_rate(Some(&GstRateInput::Number(12.5))), GstRate::Eighteen);
        assert_eq!(coerce_gst_rate(Some(&GstRateInput::Text("abc".into()))), GstRate::Eighteen);
        assert_eq!(coerce_gst_rate(Some(&GstRateInput::Text(" 0 ".into()))), GstRate::Zero);
    }

    #[test]
    fn test_gst_input_accepts_number_or_string() {
        let n: GstRateInput = serde_json::from_str("5").unwrap();
        assert_eq!(n.to_slab(), Some(GstRate::Five));
        let s: GstRateInput = serde_json::from_str("\"28\"").unwrap();
        assert_eq!(s.to_slab(), Some(GstRate::TwentyEight));
    }

    #[test]
    fn test_email() {
        assert_eq!(validate_email(" shop@example.com ").unwrap(), "shop@example.com");
        assert!(validate_email("shop@example").is_err());
        assert!(validate_email("sh op@example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("987654321").is_err());
        assert!(validate_phone("98765432a0").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("password", "secret").is_ok());
        assert_eq!(
            validate_password("password", "12345").unwrap_err(),
            ValidationError::TooShort {
                field: "password".into(),
                min: 6
            }
        );
    }

    #[test]
    fn test_gstin() {
        assert!(validate_gstin("27ABCDE1234F1Z5").is_ok());
        assert!(validate_gstin("27ABCDE1234F0Z5").is_err()); // 13th char may not be 0
        assert!(validate_gstin("27ABCDE1234F1X5").is_err()); // 14th char must be Z
        assert_eq!(validate_optional_gstin(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_hsn_code() {
        assert_eq!(validate_hsn_code(Some("8708")).unwrap(), Some("8708".into()));
        assert_eq!(validate_hsn_code(Some("87089900")).unwrap(), Some("87089900".into()));
        assert!(validate_hsn_code(Some("870")).is_err());
        assert!(validate_hsn_code(Some("870899001")).is_err());
        assert_eq!(validate_hsn_code(None).unwrap(), None);
    }

    #[test]
    fn test_part_draft() {
        let draft = validate_part_draft(part_input()).unwrap();
        assert_eq!(draft.gst_rate, GstRate::TwentyEight);
        assert_eq!(draft.quantity_owned, 12);

        let mut input = part_input();
        input.quantity_owned = None;
        input.gst_rate = Some(GstRateInput::Number(3.0));
        let draft = validate_part_draft(input).unwrap();
        assert_eq!(draft.quantity_owned, 1);
        assert_eq!(draft.gst_rate, GstRate::Eighteen);
    }

    #[test]
    fn test_part_draft_rejections() {
        let mut input = part_input();
        input.price = Some(Money::from_rupees(-1));
        assert!(matches!(
            validate_part_draft(input),
            Err(ValidationError::Negative { .. })
        ));

        let mut input = part_input();
        input.name = Some("   ".into());
        assert_eq!(
            validate_part_draft(input).unwrap_err(),
            ValidationError::required("name")
        );

        let mut input = part_input();
        input.hsn_code = Some("12".into());
        assert!(validate_part_draft(input).is_err());
    }

    #[test]
    fn test_part_draft_caps_price_and_stock() {
        let mut input = part_input();
        input.price = Some(Money::from_rupees(MAX_PART_PRICE_RUPEES));
        input.quantity_owned = Some(MAX_QUANTITY_OWNED);
        assert!(validate_part_draft(input).is_ok());

        let mut input = part_input();
        input.price = Some(Money::from_rupees(1_000_000_000_000_000_000));
        assert!(matches!(
            validate_part_draft(input),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "price"
        ));

        let mut input = part_input();
        input.original_price = Some(Money::from_rupees(MAX_PART_PRICE_RUPEES + 1));
        assert!(matches!(
            validate_part_draft(input),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "original_price"
        ));

        let mut input = part_input();
        input.quantity_owned = Some(MAX_QUANTITY_OWNED + 1);
        assert!(matches!(
            validate_part_draft(input),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "quantity_owned"
        ));
    }

    #[test]
    fn test_original_price_camel_case_alias() {
        let input: PartInput = serde_json::from_str(
            r#"{"name":"Clutch Plate","originalPrice":900,"price":850}"#,
        )
        .unwrap();
        assert_eq!(input.original_price, Some(Money::from_rupees(900)));
    }
}

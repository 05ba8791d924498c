use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// A catalog product, as returned by the backend search endpoint.
///
/// The backend encodes decimal fields as text; they are parsed exactly once
/// here, at ingestion, and nothing downstream re-parses them. Immutable
/// once received.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Product {
    /// Catalog identifier; the backend omits it for some rows.
    #[serde(rename = "ProductID", default)]
    pub id: Option<u32>,
    #[serde(rename = "ProductName")]
    pub name: String,
    /// Generic drug name.
    #[serde(rename = "Drug", default)]
    pub drug: String,
    #[serde(rename = "MRP", deserialize_with = "lenient_decimal", default)]
    pub mrp: Decimal,
    #[serde(rename = "unitPrice", deserialize_with = "lenient_decimal", default)]
    pub unit_price: Decimal,
    /// Manufacturer lot identifier; may be blank.
    #[serde(rename = "Batch", default)]
    pub batch: String,
    /// Expiry in whatever shape the catalog returned it; normalized when a
    /// cart line is created from this product.
    #[serde(rename = "Exp", default)]
    pub expiry: String,
    /// Displayed only; stock enforcement is the backend's job.
    #[serde(rename = "QtyInStock", default)]
    pub qty_in_stock: Option<i64>,
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_decimal(&raw))
}

/// Parses a string-encoded decimal, falling back to zero on missing or
/// malformed input.
pub fn parse_decimal(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim()).unwrap_or(Decimal::ZERO)
}

/// Parses an operator-entered price. Invalid input and negative values both
/// coerce to zero; discount-to-zero is legal at this layer.
pub fn parse_price(raw: &str) -> Decimal {
    parse_decimal(raw).max(Decimal::ZERO)
}

/// Normalizes a catalog expiry value to `YYYY-MM-DD`.
///
/// The backend has been observed returning RFC 3339 timestamps, bare
/// timestamps without an offset, bare dates and `DD/MM/YYYY`. Anything
/// unrecognized passes through trimmed so the operator can correct it in
/// the expiry field.
pub fn normalize_expiry(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.date_naive().to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ts.date().to_string();
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.to_string();
        }
    }
    raw.to_string()
}

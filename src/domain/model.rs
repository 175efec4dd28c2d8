use crate::utils::error::{NoteError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Euro banknote denominations tracked by the upstream dataset, ordered by
/// nominal value. The series code is the upstream identifier, the number is
/// the face value in euro.
pub const DENOMINATIONS: [(&str, u32); 7] = [
    ("B5", 5),
    ("B10", 10),
    ("B20", 20),
    ("B50", 50),
    ("B100", 100),
    ("B200", 200),
    ("B500", 500),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankNoteFilters {
    pub start_period: DateTime<Utc>,
    pub end_period: DateTime<Utc>,
}

/// One upstream time-series data point: note pieces in circulation at `period`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankNoteObservation {
    pub period: DateTime<Utc>,
    pub period_code: String,
    pub value: Decimal,
}

/// The worth of one denomination's circulating total in a foreign currency.
/// `value` and `exchange_rate` are dot-formatted decimal text regardless of
/// host locale; downstream consumers depend on that representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyValue {
    pub currency_code: String,
    pub value: String,
    pub exchange_rate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankNoteSummary {
    pub denomination: u32,
    pub denomination_code: String,
    pub currency_code: String,
    pub count: i64,
    pub value: Decimal,
    pub currency_values: Vec<CurrencyValue>,
}

/// Parses decimal text as published by the upstream API, which uses a comma
/// as the decimal separator (`"2,0"`). Empty or missing input means "no rate
/// published" and parses to zero; anything else malformed is a hard error.
pub fn parse_upstream_decimal(value: Option<&str>) -> Result<Decimal> {
    let text = match value {
        Some(v) if !v.is_empty() => v,
        _ => return Ok(Decimal::ZERO),
    };

    Decimal::from_str(&text.replace(',', ".")).map_err(|_| NoteError::InvalidDecimal {
        value: text.to_string(),
    })
}

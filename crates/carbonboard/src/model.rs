//! Record types for carbonboard.
//!
//! This module defines the two document shapes held by the data store and
//! the small value types used to address and order them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Store-generated key of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wrap a raw store key.
    #[must_use]
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw store key.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::invalid_input("id", format!("'{s}' is not a record id")))
    }
}

/// A named model and its CO2-equivalent tonnage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    /// Store-generated key.
    #[serde(rename = "_id")]
    pub id: RecordId,

    /// Model label. Intended to be unique, but duplicates are stored as-is.
    #[serde(rename = "Model")]
    pub model: String,

    /// Tons of CO2 equivalent, or `None` when submitted empty.
    #[serde(rename = "tonCO2eq")]
    pub ton_co2eq: Option<f64>,

    /// When the record was last inserted or updated.
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Aggregate emissions for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyEmission {
    /// Store-generated key.
    #[serde(rename = "_id")]
    pub id: RecordId,

    /// Calendar year.
    pub year: i64,

    /// Tons of CO2 equivalent emitted in that year.
    #[serde(rename = "tonCO2eq")]
    pub ton_co2eq: Option<f64>,
}

/// Direction of a sort on `tonCO2eq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest value first.
    #[default]
    Ascending,
    /// Largest value first.
    Descending,
}

impl SortOrder {
    /// SQL keyword for this direction.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Coerce a submitted tonnage into a stored value.
///
/// Surrounding whitespace is ignored and an empty value becomes `None`.
/// Anything else must be a finite number; its sign is not checked.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the value is not a finite number.
pub fn parse_ton_co2eq(raw: &str) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(Error::invalid_input(
            "tonCO2eq",
            format!("'{raw}' is not a number"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_from_str() {
        assert_eq!("42".parse::<RecordId>().unwrap(), RecordId::new(42));
        assert_eq!(" 7 ".parse::<RecordId>().unwrap().get(), 7);
    }

    #[test]
    fn test_record_id_from_str_rejects_garbage() {
        let err = "65a1f0c2e4b0".parse::<RecordId>().unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("65a1f0c2e4b0"));
    }

    #[test]
    fn test_record_id_display() {
        assert_eq!(RecordId::new(3).to_string(), "3");
    }

    #[test]
    fn test_parse_ton_co2eq() {
        assert_eq!(parse_ton_co2eq("2.5").unwrap(), Some(2.5));
        assert_eq!(parse_ton_co2eq(" 9 ").unwrap(), Some(9.0));
        assert_eq!(parse_ton_co2eq("-1.25").unwrap(), Some(-1.25));
        assert_eq!(parse_ton_co2eq("").unwrap(), None);
        assert_eq!(parse_ton_co2eq("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_ton_co2eq_rejects_non_numbers() {
        assert!(parse_ton_co2eq("abc").unwrap_err().is_invalid_input());
        assert!(parse_ton_co2eq("NaN").is_err());
        assert!(parse_ton_co2eq("inf").is_err());
    }

    #[test]
    fn test_sort_order_sql() {
        assert_eq!(SortOrder::Ascending.as_sql(), "ASC");
        assert_eq!(SortOrder::Descending.as_sql(), "DESC");
        assert_eq!(SortOrder::default(), SortOrder::Ascending);
    }

    #[test]
    fn test_emission_factor_serializes_chart_field_names() {
        let record = EmissionFactor {
            id: RecordId::new(1),
            model: "Sedan-A".to_string(),
            ton_co2eq: Some(2.5),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["_id"], 1);
        assert_eq!(json["Model"], "Sedan-A");
        assert_eq!(json["tonCO2eq"], 2.5);
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_yearly_emission_null_value() {
        let record = YearlyEmission {
            id: RecordId::new(1),
            year: 2020,
            ton_co2eq: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"tonCO2eq\":null"));
        assert!(json.contains("\"year\":2020"));
    }
}

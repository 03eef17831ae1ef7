//! Template contexts.
//!
//! A list page gets the records twice: as structured values for the table
//! and as JSON text for the chart script. [`ChartView::new`] builds both from
//! the same query result so they cannot drift apart.

use serde::Serialize;

use crate::error::Result;
use crate::model::EmissionFactor;

/// Serialize `value` as JSON that is safe to embed inside a `<script>` tag.
///
/// Characters that could close the script element or start an HTML entity
/// are written as `\uXXXX` escapes, which JSON parsers read back unchanged.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn script_safe_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(ch),
        }
    }
    Ok(out)
}

/// Records for a table plus the same records as chart JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ChartView<T: Serialize> {
    /// Structured records.
    pub list: Vec<T>,
    /// `list` as script-safe JSON.
    pub data: String,
}

impl<T: Serialize> ChartView<T> {
    /// Build both representations from one query result.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be serialized.
    pub fn new(list: Vec<T>) -> Result<Self> {
        let data = script_safe_json(&list)?;
        Ok(Self { list, data })
    }
}

/// Message shown at the top of the index page after a failed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// An edit was submitted but not applied.
    EditFailed,
}

impl Notice {
    /// Query-string code carried by the redirect.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::EditFailed => "edit_failed",
        }
    }

    /// Look up a notice by its query-string code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "edit_failed" => Some(Self::EditFailed),
            _ => None,
        }
    }

    /// Text shown to the user.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::EditFailed => "The record could not be updated.",
        }
    }
}

/// Context for the index, sort and reverse-sort pages.
#[derive(Debug, Clone, Serialize)]
pub struct FactorPage {
    /// Records and their chart JSON.
    #[serde(flatten)]
    pub chart: ChartView<EmissionFactor>,
    /// Mean tonnage, `None` if there is nothing to average.
    pub average: Option<f64>,
    /// `average` as script-safe JSON (`null` when absent).
    pub chart_avg: String,
    /// Optional message from a previous action.
    pub notice: Option<&'static str>,
}

impl FactorPage {
    /// Assemble a page from a listing and the current average.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be serialized.
    pub fn new(records: Vec<EmissionFactor>, average: Option<f64>) -> Result<Self> {
        Ok(Self {
            chart: ChartView::new(records)?,
            average,
            chart_avg: script_safe_json(&average)?,
            notice: None,
        })
    }

    /// Attach a notice.
    #[must_use]
    pub fn with_notice(mut self, notice: Option<Notice>) -> Self {
        self.notice = notice.map(Notice::message);
        self
    }
}

/// Context for the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct DetailPage {
    /// The record, if one matched.
    pub model_value: Option<EmissionFactor>,
    /// `model_value` as script-safe JSON (`null` when absent).
    pub data: String,
    /// Mean tonnage across all records, when it was looked up.
    pub average: Option<f64>,
}

impl DetailPage {
    /// Assemble a detail page.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized.
    pub fn new(model_value: Option<EmissionFactor>, average: Option<f64>) -> Result<Self> {
        let data = script_safe_json(&model_value)?;
        Ok(Self {
            model_value,
            data,
            average,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RecordId, YearlyEmission};
    use chrono::Utc;

    fn factor(id: i64, model: &str, ton: Option<f64>) -> EmissionFactor {
        EmissionFactor {
            id: RecordId::new(id),
            model: model.to_string(),
            ton_co2eq: ton,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_script_safe_json_escapes_markup() {
        let json = script_safe_json("</script><b>&").unwrap();
        assert!(!json.contains('<'));
        assert!(!json.contains('>'));
        assert!(!json.contains('&'));

        let back: String = serde_json::from_str(&json).unwrap();
        assert_eq!(back, "</script><b>&");
    }

    #[test]
    fn test_script_safe_json_line_separators() {
        let json = script_safe_json("a\u{2028}b\u{2029}c").unwrap();
        assert_eq!(json, "\"a\\u2028b\\u2029c\"");
    }

    #[test]
    fn test_chart_view_representations_agree() {
        let view = ChartView::new(vec![factor(1, "Sedan-A", Some(2.5))]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&view.data).unwrap();

        assert_eq!(parsed.as_array().unwrap().len(), view.list.len());
        assert_eq!(parsed[0]["Model"], "Sedan-A");
        assert_eq!(parsed[0]["tonCO2eq"], 2.5);
    }

    #[test]
    fn test_chart_view_yearly() {
        let view = ChartView::new(vec![YearlyEmission {
            id: RecordId::new(1),
            year: 2020,
            ton_co2eq: Some(10.0),
        }])
        .unwrap();
        assert!(view.data.contains("\"year\":2020"));
    }

    #[test]
    fn test_factor_page_average() {
        let page = FactorPage::new(vec![], Some(5.75)).unwrap();
        assert_eq!(page.chart_avg, "5.75");
        assert_eq!(page.chart.data, "[]");

        let empty = FactorPage::new(vec![], None).unwrap();
        assert_eq!(empty.chart_avg, "null");
    }

    #[test]
    fn test_factor_page_flattens_chart() {
        let page = FactorPage::new(vec![factor(1, "A", None)], None).unwrap();
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("list").is_some());
        assert!(json.get("data").is_some());
        assert!(json.get("chart").is_none());
    }

    #[test]
    fn test_notice_codes() {
        assert_eq!(Notice::from_code("edit_failed"), Some(Notice::EditFailed));
        assert_eq!(Notice::from_code("nope"), None);
        assert_eq!(Notice::EditFailed.code(), "edit_failed");

        let page = FactorPage::new(vec![], None)
            .unwrap()
            .with_notice(Notice::from_code("edit_failed"));
        assert_eq!(page.notice, Some("The record could not be updated."));
    }

    #[test]
    fn test_detail_page_missing_record() {
        let page = DetailPage::new(None, None).unwrap();
        assert_eq!(page.data, "null");
        assert!(page.model_value.is_none());
    }
}

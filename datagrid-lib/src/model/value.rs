//! Tagged cell values

use std::fmt;
use std::sync::LazyLock;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::SecondsFormat;
use chrono::TimeZone;
use chrono::Utc;
use regex::Regex;
use serde::Serialize;

use super::ColumnType;

/// Leading `YYYY-MM-DD` marks a string as an ISO date for comparison.
static ISO_DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("Invalid ISO date regex"));

/// A single cell value.
///
/// Filters, search, sort and export all dispatch on this closed set of
/// variants. Raw values are converted with [`CellValue::coerce`] according to
/// the column type before they are compared.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{CellValue, ColumnType};
///
/// let age = CellValue::from("42").coerce(ColumnType::Number);
/// assert_eq!(age, CellValue::Number(42.0));
///
/// let bad = CellValue::from("x").coerce(ColumnType::Number);
/// assert_eq!(bad.as_number(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Null or absent value.
    #[default]
    Missing,
    /// Boolean value.
    Boolean(bool),
    /// Numeric value.
    Number(f64),
    /// Point in time.
    Timestamp(DateTime<Utc>),
    /// String value.
    Text(String),
}

impl CellValue {
    /// Returns `true` for a null/absent value.
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Returns `true` for a missing value or the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Missing => "missing",
            CellValue::Boolean(_) => "boolean",
            CellValue::Number(_) => "number",
            CellValue::Timestamp(_) => "timestamp",
            CellValue::Text(_) => "text",
        }
    }

    /// Converts a JSON value. Arrays and objects keep their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Missing,
            serde_json::Value::Bool(b) => CellValue::Boolean(*b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// Coerces the value to the representation used for a column type.
    ///
    /// Values that cannot be coerced are returned unchanged, so a `number`
    /// column may still hold `Text("x")`. Numeric filters reject such values.
    pub fn coerce(&self, column_type: ColumnType) -> CellValue {
        match (column_type, self) {
            (ColumnType::Number | ColumnType::Currency, CellValue::Text(s)) => parse_number(s)
                .map(CellValue::Number)
                .unwrap_or_else(|| self.clone()),
            (ColumnType::Date, CellValue::Text(s)) => parse_timestamp(s)
                .map(CellValue::Timestamp)
                .unwrap_or_else(|| self.clone()),
            (ColumnType::Date, CellValue::Number(n)) => timestamp_from_millis(*n)
                .map(CellValue::Timestamp)
                .unwrap_or_else(|| self.clone()),
            (ColumnType::Boolean, CellValue::Text(s)) => match s.trim().to_lowercase().as_str() {
                "true" => CellValue::Boolean(true),
                "false" => CellValue::Boolean(false),
                _ => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Numeric view of the value, if it has one.
    ///
    /// Timestamps convert to epoch milliseconds and booleans to 0/1.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) | CellValue::Missing => None,
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Timestamp(ts) => Some(ts.timestamp_millis() as f64),
            CellValue::Text(s) => parse_number(s),
        }
    }

    /// Timestamp view of the value, if it has one.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::Timestamp(ts) => Some(*ts),
            CellValue::Number(n) => timestamp_from_millis(*n),
            CellValue::Text(s) => parse_timestamp(s),
            CellValue::Boolean(_) | CellValue::Missing => None,
        }
    }

    /// String coercion used by string filters, search and export.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Missing => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Timestamp(ts) => {
                write!(f, "{}", ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// Parses a trimmed, finite number. Empty strings are not numbers.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Returns `true` if the string starts with a `YYYY-MM-DD` date.
pub fn has_iso_date_prefix(s: &str) -> bool {
    ISO_DATE_PREFIX.is_match(s)
}

/// Parses RFC 3339, `YYYY-MM-DD[ T]HH:MM:SS[.f]` (as UTC) or a bare date.
///
/// Strings that merely start with an ISO date fall back to that date.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let trimmed = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    let date_part = if has_iso_date_prefix(trimmed) {
        trimmed.get(..10)?
    } else {
        trimmed
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn timestamp_from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Boolean(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Number(f64::from(v))
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(v: DateTime<Utc>) -> Self {
        CellValue::Timestamp(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(v: &serde_json::Value) -> Self {
        CellValue::from_json(v)
    }
}

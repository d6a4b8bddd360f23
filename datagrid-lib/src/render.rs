//! Display formatting for cells and headers.

use std::fmt::Write;

use crate::config::GridConfig;
use crate::model::{CellValue, Column, ColumnType};
use crate::query::SortState;

/// Text shown for a date cell whose value cannot be read as a date.
pub const INVALID_DATE: &str = "Invalid date";

/// Rendered content of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellDisplay {
    Text(String),
    /// The value could not be formatted for its column type. Only this cell
    /// is affected.
    Invalid(String),
}

impl CellDisplay {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Invalid(s) => s,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

impl std::fmt::Display for CellDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats a raw cell value for display in `column`.
pub fn format_cell(column: &Column, value: &CellValue, config: &GridConfig) -> CellDisplay {
    if value.is_missing() {
        return CellDisplay::Text(String::new());
    }
    let value = value.coerce(column.column_type);
    match (column.column_type, &value) {
        (ColumnType::Currency, CellValue::Number(n)) => {
            CellDisplay::Text(format_currency(*n, &config.currency_symbol))
        }
        (ColumnType::Boolean, CellValue::Boolean(b)) => {
            CellDisplay::Text(if *b { "Yes" } else { "No" }.to_string())
        }
        (ColumnType::Date, CellValue::Timestamp(ts)) => {
            let mut out = String::new();
            if write!(out, "{}", ts.format(&config.date_format)).is_err() {
                log::warn!("Invalid date format '{}'", config.date_format);
                out = value.to_text();
            }
            CellDisplay::Text(out)
        }
        (ColumnType::Date, _) => CellDisplay::Invalid(INVALID_DATE.to_string()),
        _ => CellDisplay::Text(value.to_text()),
    }
}

/// `-$1,234.50` style amount with two decimals.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, grouped, cents)
}

/// Header text with the sort indicator, plus the key's priority in a
/// multi-key sort.
pub fn header_label(column: &Column, sort: &SortState) -> String {
    let Some(direction) = sort.direction_of(&column.field) else {
        return column.header.clone();
    };
    match sort.priority_of(&column.field) {
        Some(priority) if sort.is_multi() => {
            format!("{} {}{}", column.header, direction.indicator(), priority + 1)
        }
        _ => format!("{} {}", column.header, direction.indicator()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SortDirection, SortKey};

    #[test]
    fn test_currency_grouping() {
        assert_eq!(format_currency(1234567.5, "$"), "$1,234,567.50");
        assert_eq!(format_currency(-12.346, "€"), "-€12.35");
        assert_eq!(format_currency(999.0, "$"), "$999.00");
        assert_eq!(format_currency(-0.001, "$"), "$0.00");
    }

    #[test]
    fn test_unparseable_date_is_invalid() {
        let column = Column::new("due", "Due").column_type(ColumnType::Date);
        let config = GridConfig::default();
        assert_eq!(
            format_cell(&column, &CellValue::from("soon"), &config),
            CellDisplay::Invalid(INVALID_DATE.to_string())
        );
        assert_eq!(
            format_cell(&column, &CellValue::from("2024-03-05T10:00:00Z"), &config),
            CellDisplay::Text("2024-03-05".to_string())
        );
    }

    #[test]
    fn test_boolean_and_missing() {
        let column = Column::new("ok", "OK").column_type(ColumnType::Boolean);
        let config = GridConfig::default();
        assert_eq!(format_cell(&column, &true.into(), &config).as_str(), "Yes");
        assert_eq!(format_cell(&column, &CellValue::Missing, &config).as_str(), "");
    }

    #[test]
    fn test_header_label_shows_priority_in_multi_sort() {
        let column = Column::new("name", "Name");
        let sort = SortState::multi([SortKey::asc("age"), SortKey::desc("name")]);
        assert_eq!(header_label(&column, &sort), "Name ▼2");
        let sort = SortState::single("name", SortDirection::Asc);
        assert_eq!(header_label(&column, &sort), "Name ▲");
    }
}

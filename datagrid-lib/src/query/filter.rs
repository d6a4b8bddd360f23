//! Per-column filter predicates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::columns::ColumnRegistry;
use crate::model::{CellValue, ColumnType, GridRow, parse_number, parse_timestamp};

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Contains,
    Equals,
    StartsWith,
    EndsWith,
    Gt,
    Lt,
    Gte,
    Lte,
    Empty,
    NotEmpty,
}

impl FilterOperator {
    /// Identifier as used in filter maps.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Empty => "empty",
            Self::NotEmpty => "notEmpty",
        }
    }

    /// Display label for filter menus.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::StartsWith => "starts with",
            Self::EndsWith => "ends with",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Empty => "is empty",
            Self::NotEmpty => "is not empty",
        }
    }

    /// Returns true if this operator compares against a value.
    pub fn requires_value(&self) -> bool {
        !matches!(self, Self::Empty | Self::NotEmpty)
    }

    /// Returns true for the ordering operators.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Gt | Self::Lt | Self::Gte | Self::Lte)
    }

    /// Operators offered for a column type. Ordering operators only make
    /// sense for numbers and dates.
    pub fn for_column(column_type: ColumnType) -> &'static [FilterOperator] {
        if column_type.is_numeric() || column_type == ColumnType::Date {
            Self::all()
        } else {
            &[
                Self::Contains,
                Self::Equals,
                Self::StartsWith,
                Self::EndsWith,
                Self::Empty,
                Self::NotEmpty,
            ]
        }
    }

    /// All operators in display order.
    pub fn all() -> &'static [FilterOperator] {
        &[
            Self::Contains,
            Self::Equals,
            Self::StartsWith,
            Self::EndsWith,
            Self::Gt,
            Self::Lt,
            Self::Gte,
            Self::Lte,
            Self::Empty,
            Self::NotEmpty,
        ]
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown filter operator '{}'", s))
    }
}

/// A filter on one column.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{CellValue, ColumnType};
/// use datagrid_lib::query::FilterPredicate;
///
/// let adults = FilterPredicate::gte("age", "18");
/// assert!(adults.matches(&CellValue::Number(30.0), ColumnType::Number));
/// assert!(!adults.matches(&CellValue::from("n/a"), ColumnType::Number));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: String,
}

impl FilterPredicate {
    /// Creates a predicate.
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Contains, value)
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::StartsWith, value)
    }

    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::EndsWith, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Gt, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Lt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Gte, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Lte, value)
    }

    pub fn empty(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Empty, "")
    }

    pub fn not_empty(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::NotEmpty, "")
    }

    /// A predicate whose operator needs a value but has none does not filter.
    pub fn is_active(&self) -> bool {
        !self.operator.requires_value() || !self.value.is_empty()
    }

    /// Evaluates the predicate against one cell.
    ///
    /// Empty values satisfy only `empty`. String operators compare the
    /// lowercased string forms of the raw cell. Ordering operators coerce both
    /// sides to numbers (timestamps for date columns); anything non-coercible
    /// fails.
    pub fn matches(&self, value: &CellValue, column_type: ColumnType) -> bool {
        match self.operator {
            FilterOperator::Empty => value.is_empty(),
            FilterOperator::NotEmpty => !value.is_empty(),
            _ if value.is_empty() => false,
            FilterOperator::Contains => self.compare_text(value, |v, n| v.contains(n)),
            FilterOperator::Equals => self.compare_text(value, |v, n| v == n),
            FilterOperator::StartsWith => self.compare_text(value, |v, n| v.starts_with(n)),
            FilterOperator::EndsWith => self.compare_text(value, |v, n| v.ends_with(n)),
            FilterOperator::Gt => self.compare_ordered(value, column_type, |a, b| a > b),
            FilterOperator::Lt => self.compare_ordered(value, column_type, |a, b| a < b),
            FilterOperator::Gte => self.compare_ordered(value, column_type, |a, b| a >= b),
            FilterOperator::Lte => self.compare_ordered(value, column_type, |a, b| a <= b),
        }
    }

    fn compare_text(&self, value: &CellValue, test: impl Fn(&str, &str) -> bool) -> bool {
        test(&value.to_text().to_lowercase(), &self.value.to_lowercase())
    }

    fn compare_ordered(
        &self,
        value: &CellValue,
        column_type: ColumnType,
        test: impl Fn(f64, f64) -> bool,
    ) -> bool {
        let value = value.coerce(column_type);
        let operands = if column_type == ColumnType::Date {
            value
                .as_timestamp()
                .zip(parse_timestamp(&self.value))
                .map(|(a, b)| (a.timestamp_millis() as f64, b.timestamp_millis() as f64))
        } else {
            value.as_number().zip(parse_number(&self.value))
        };
        operands.is_some_and(|(a, b)| test(a, b))
    }
}

/// How multiple active predicates combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterLogic {
    /// Every predicate must match.
    #[default]
    And,
    /// At least one predicate must match.
    Or,
}

impl FromStr for FilterLogic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            _ => Err(format!("unknown filter logic '{}'", s)),
        }
    }
}

/// Active filters keyed by field. An absent key means no filter on that column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    predicates: BTreeMap<String, FilterPredicate>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a predicate, replacing any previous one on the same field.
    pub fn insert(&mut self, predicate: FilterPredicate) -> Option<FilterPredicate> {
        self.predicates.insert(predicate.field.clone(), predicate)
    }

    /// Removes the predicate on a field.
    pub fn remove(&mut self, field: &str) -> Option<FilterPredicate> {
        self.predicates.remove(field)
    }

    /// Returns the predicate on a field.
    pub fn get(&self, field: &str) -> Option<&FilterPredicate> {
        self.predicates.get(field)
    }

    /// Removes every predicate.
    pub fn clear(&mut self) {
        self.predicates.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// All predicates, ordered by field.
    pub fn iter(&self) -> impl Iterator<Item = &FilterPredicate> {
        self.predicates.values()
    }

    /// Predicates that actually constrain rows.
    pub fn active(&self) -> impl Iterator<Item = &FilterPredicate> {
        self.iter().filter(|p| p.is_active())
    }

    /// Evaluates all active predicates against a row.
    pub fn matches_row<R: GridRow>(
        &self,
        row: &R,
        registry: &ColumnRegistry,
        logic: FilterLogic,
    ) -> bool {
        let mut active = self.active().peekable();
        if active.peek().is_none() {
            return true;
        }
        let test = |p: &FilterPredicate| {
            let column_type = registry
                .get(&p.field)
                .map(|c| c.column_type)
                .unwrap_or_default();
            p.matches(&row.value(&p.field), column_type)
        };
        match logic {
            FilterLogic::And => active.all(test),
            FilterLogic::Or => active.any(test),
        }
    }
}

/// Indices of the rows passing the filter set, in source order.
pub fn filter_indices<R: GridRow>(
    rows: &[R],
    registry: &ColumnRegistry,
    filters: &FilterSet,
    logic: FilterLogic,
) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| filters.matches_row(*row, registry, logic))
        .map(|(i, _)| i)
        .collect()
}

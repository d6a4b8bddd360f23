//! Single- and multi-key sorting with type-aware comparators.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::Serialize;

use crate::columns::ColumnRegistry;
use crate::model::{CellValue, Column, GridRow, has_iso_date_prefix, parse_timestamp};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Header indicator.
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(format!("unknown sort direction '{}'", s)),
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Ascending key.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Descending key.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// How a user gesture on a header changes the sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortGesture {
    /// Plain click.
    #[default]
    Primary,
    /// Modifier click that builds a multi-key sort.
    Additive,
}

/// Whether a plain click may extend an active multi-sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortPolicy {
    /// A plain click always replaces any sort with a single-key sort.
    #[default]
    ResetToSingle,
    /// A plain click toggles or appends within an active multi-sort.
    KeepMulti,
}

/// Current sort. Single and multi-key modes are mutually exclusive.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::{SortDirection, SortGesture, SortPolicy, SortState};
///
/// let state = SortState::default()
///     .toggle("name", SortGesture::Primary, SortPolicy::ResetToSingle)
///     .toggle("name", SortGesture::Primary, SortPolicy::ResetToSingle);
/// assert_eq!(state.direction_of("name"), Some(SortDirection::Desc));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortState {
    #[default]
    Unsorted,
    Single(SortKey),
    Multi(Vec<SortKey>),
}

impl SortState {
    /// Single-key sort.
    pub fn single(field: impl Into<String>, direction: SortDirection) -> Self {
        Self::Single(SortKey::new(field, direction))
    }

    /// Multi-key sort. A field repeated later in `keys` is dropped.
    pub fn multi(keys: impl IntoIterator<Item = SortKey>) -> Self {
        let mut unique: Vec<SortKey> = Vec::new();
        for key in keys {
            if !unique.iter().any(|k| k.field == key.field) {
                unique.push(key);
            }
        }
        if unique.is_empty() {
            Self::Unsorted
        } else {
            Self::Multi(unique)
        }
    }

    /// Keys in evaluation order.
    pub fn keys(&self) -> &[SortKey] {
        match self {
            Self::Unsorted => &[],
            Self::Single(key) => std::slice::from_ref(key),
            Self::Multi(keys) => keys,
        }
    }

    pub fn is_sorted(&self) -> bool {
        !self.keys().is_empty()
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    /// Direction applied to a field, if it is sorted.
    pub fn direction_of(&self, field: &str) -> Option<SortDirection> {
        self.keys()
            .iter()
            .find(|k| k.field == field)
            .map(|k| k.direction)
    }

    /// Zero-based priority of a field in the key sequence.
    pub fn priority_of(&self, field: &str) -> Option<usize> {
        self.keys().iter().position(|k| k.field == field)
    }

    /// Applies a header gesture and returns the new state.
    ///
    /// A primary click on the single-sorted field flips its direction, on any
    /// other field it starts an ascending single-key sort. An additive click
    /// flips a field already in the multi-sort or appends it ascending; it
    /// replaces a single-key sort with a fresh multi-sort.
    pub fn toggle(&self, field: &str, gesture: SortGesture, policy: SortPolicy) -> SortState {
        let additive = match gesture {
            SortGesture::Additive => true,
            SortGesture::Primary => policy == SortPolicy::KeepMulti && self.is_multi(),
        };

        if !additive {
            let direction = match self {
                Self::Single(key) if key.field == field => key.direction.toggled(),
                _ => SortDirection::Asc,
            };
            return Self::single(field, direction);
        }

        let mut keys = match self {
            Self::Multi(keys) => keys.clone(),
            _ => Vec::new(),
        };
        match keys.iter_mut().find(|k| k.field == field) {
            Some(key) => key.direction = key.direction.toggled(),
            None => keys.push(SortKey::asc(field)),
        }
        Self::Multi(keys)
    }
}

// =============================================================================
// Comparators
// =============================================================================

/// Default ascending comparison of two coerced cell values.
///
/// Values are ranked by kind first: numbers, timestamps, booleans, strings
/// starting with an ISO date, other text, and finally missing values. So in
/// a `number` column non-numeric text sorts after every number, and missing
/// values land last ascending and first descending. Within a rank numbers
/// compare numerically, timestamps and ISO-prefixed strings chronologically,
/// and text by its lowercased form. The result is a total order.
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) => x.total_cmp(y),
        (CellValue::Timestamp(x), CellValue::Timestamp(y)) => x.cmp(y),
        (CellValue::Boolean(x), CellValue::Boolean(y)) => x.cmp(y),
        (CellValue::Text(x), CellValue::Text(y)) => match (text_timestamp(x), text_timestamp(y)) {
            (Some(tx), Some(ty)) => tx.cmp(&ty).then_with(|| compare_text(x, y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => compare_text(x, y),
        },
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Position of a value's kind in the default ordering.
fn rank(value: &CellValue) -> u8 {
    match value {
        CellValue::Number(_) => 0,
        CellValue::Timestamp(_) => 1,
        CellValue::Boolean(_) => 2,
        CellValue::Text(s) if text_timestamp(s).is_some() => 3,
        CellValue::Text(_) => 4,
        CellValue::Missing => 5,
    }
}

fn text_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if has_iso_date_prefix(s) {
        parse_timestamp(s)
    } else {
        None
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// A sort key bound to its column.
struct ResolvedKey<'a> {
    column: &'a Column,
    direction: SortDirection,
}

impl ResolvedKey<'_> {
    fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
        let ordering = match &self.column.comparator {
            Some(comparator) => comparator(a, b),
            None => compare_values(a, b),
        };
        self.direction.apply(ordering)
    }
}

/// Reorders `indices` by the sort state.
///
/// Keys naming an unknown column are skipped. Each key's values are extracted
/// and coerced once up front. Equal rows keep their relative order.
pub fn sort_indices<R: GridRow>(
    rows: &[R],
    indices: &mut [usize],
    state: &SortState,
    registry: &ColumnRegistry,
) {
    let keys: Vec<ResolvedKey<'_>> = state
        .keys()
        .iter()
        .filter_map(|key| {
            let column = registry.get(&key.field);
            if column.is_none() {
                log::debug!("Skipping sort key for unknown column '{}'", key.field);
            }
            column.map(|column| ResolvedKey {
                column,
                direction: key.direction,
            })
        })
        .collect();
    if keys.is_empty() || indices.len() < 2 {
        return;
    }

    let mut decorated: Vec<(usize, Vec<CellValue>)> = indices
        .iter()
        .map(|&i| {
            let values = keys
                .iter()
                .map(|key| match rows.get(i) {
                    Some(row) => row
                        .value(&key.column.field)
                        .coerce(key.column.column_type),
                    None => CellValue::Missing,
                })
                .collect();
            (i, values)
        })
        .collect();

    decorated.sort_by(|(_, a), (_, b)| {
        keys.iter()
            .zip(a.iter().zip(b.iter()))
            .map(|(key, (va, vb))| key.compare(va, vb))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    for (slot, (index, _)) in indices.iter_mut().zip(decorated) {
        *slot = index;
    }
}

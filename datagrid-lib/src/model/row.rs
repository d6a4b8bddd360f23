//! Row access and the stock JSON-backed record

use std::collections::HashMap;

use super::CellValue;

/// Read access to a keyed row.
///
/// The engine only needs a stable key and field lookup. `set_value` is used
/// solely for the optimistic local echo after an inline edit is committed.
pub trait GridRow: Clone {
    /// Stable unique key used for selection and edit identity.
    fn key(&self) -> String;

    /// Value of a field. Absent fields are [`CellValue::Missing`].
    fn value(&self, field: &str) -> CellValue;

    /// Overwrite a field in this local copy.
    fn set_value(&mut self, field: &str, value: CellValue);
}

/// A dynamic keyed record.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{CellValue, GridRow, Record};
///
/// let row = Record::new("1").set("name", "Ada").set("age", 36);
/// assert_eq!(row.key(), "1");
/// assert_eq!(row.value("age"), CellValue::Number(36.0));
/// assert_eq!(row.value("missing"), CellValue::Missing);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    key: String,
    fields: HashMap<String, CellValue>,
}

impl Record {
    /// Creates an empty record with the given key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: HashMap::new(),
        }
    }

    /// Sets a field, builder style.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Returns a reference to the field value, if present.
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    /// Returns the field names.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Builds a record from a JSON object.
    ///
    /// The key is read from `key_field`; rows without one are keyed by their
    /// position in the input.
    pub fn from_json_object(
        object: &serde_json::Map<String, serde_json::Value>,
        key_field: &str,
        position: usize,
    ) -> Self {
        let key = match object.get(key_field) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => position.to_string(),
            Some(other) => other.to_string(),
        };
        let fields = object
            .iter()
            .map(|(name, value)| (name.clone(), CellValue::from_json(value)))
            .collect();
        Self { key, fields }
    }
}

impl GridRow for Record {
    fn key(&self) -> String {
        self.key.clone()
    }

    fn value(&self, field: &str) -> CellValue {
        self.fields.get(field).cloned().unwrap_or_default()
    }

    fn set_value(&mut self, field: &str, value: CellValue) {
        self.fields.insert(field.to_string(), value);
    }
}

/// Converts a JSON row set into records.
///
/// Input that is not an array degrades to an empty row set. Array elements
/// that are not objects are skipped.
pub fn rows_from_json(value: &serde_json::Value, key_field: &str) -> Vec<Record> {
    let Some(items) = value.as_array() else {
        log::warn!(
            "Row input is {} rather than an array, treating as empty",
            json_kind(value)
        );
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| match item.as_object() {
            Some(object) => Some(Record::from_json_object(object, key_field, position)),
            None => {
                log::debug!("Skipping non-object row at position {}", position);
                None
            }
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

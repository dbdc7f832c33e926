//! Dynamic table row

use std::collections::HashMap;

use super::Value;

/// One record in a grid.
///
/// Rows hold field values as a `HashMap<String, Value>` keyed by column
/// accessor. They carry no behaviour beyond field access; which field
/// identifies the row is decided by the entity the grid is built for.
///
/// # Example
///
/// ```
/// use refgrid_lib::model::Row;
///
/// let row = Row::new()
///     .set("id", 1)
///     .set("name", "Hotel Dieu de France Hospital");
///
/// assert_eq!(row.id_key("id"), "1");
/// assert_eq!(row.get_display("name"), "Hotel Dieu de France Hospital");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub(crate) fields: HashMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    // =========================================================================
    // Field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the value of a field, treating a missing field as null.
    pub fn value(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.get(field).unwrap_or(&NULL)
    }

    /// Returns the display string of a field.
    pub fn get_display(&self, field: &str) -> String {
        self.value(field).as_display()
    }

    /// Returns the string form of the identifier field.
    ///
    /// This is the key used to correlate UI state (selection, pending
    /// changes) with backend records.
    pub fn id_key(&self, id_field: &str) -> String {
        self.value(id_field).to_string()
    }

    /// Returns `true` if the row contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value, returning the previous one.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Converts the row to a JSON object, turning placeholders into `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_reads_as_null() {
        let row = Row::new().set("id", 4);
        assert_eq!(row.value("name"), &Value::Null);
        assert_eq!(row.get_display("name"), "N/A");
        assert!(!row.contains("name"));
    }

    #[test]
    fn test_to_json_sends_placeholder_as_null() {
        let row = Row::new()
            .set("id", 4)
            .set("name", "Rafik Hariri University Hospital")
            .set("email", Value::na());
        assert_eq!(
            row.to_json(),
            serde_json::json!({
                "id": 4,
                "name": "Rafik Hariri University Hospital",
                "email": null
            })
        );
    }
}

//! Patient record - a typed view over one open-schema JSON object from the dataset.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Placeholder shown in the document for display fields the record lacks.
pub const NOT_PROVIDED: &str = "Not Provided";

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("patient record must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// A single patient's administrative and clinical metadata.
///
/// The source object is kept verbatim so fields this crate does not know about
/// reach the generation prompt unmodified. The fields the document layout
/// needs are pulled out as explicit optionals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct PatientRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub admission_date: Option<String>,
    pub discharge_date: Option<String>,
    pub primary_consultant_name: Option<String>,
    source: Map<String, Value>,
}

impl PatientRecord {
    /// Build a record from a JSON object.
    pub fn from_map(source: Map<String, Value>) -> Self {
        let text = |key: &str| source.get(key).and_then(display_text);
        Self {
            id: text("id"),
            name: text("name"),
            age: text("age"),
            gender: text("gender"),
            address: text("address"),
            admission_date: text("admission_date"),
            discharge_date: text("discharge_date"),
            primary_consultant_name: text("primary_consultant_name"),
            source,
        }
    }

    /// The record exactly as it appeared in the dataset.
    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }

    /// Look up any field, including ones outside the typed set.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.source.get(key)
    }

    /// Whether this record answers to the given ID and name.
    ///
    /// IDs match exactly after trimming; names match ignoring case after trimming.
    /// Blank queries never match.
    pub fn matches(&self, id: &str, name: &str) -> bool {
        let (id, name) = (id.trim(), name.trim());
        if id.is_empty() || name.is_empty() {
            return false;
        }
        let id_matches = self.id.as_deref().is_some_and(|own| own.trim() == id);
        let name_matches = self
            .name
            .as_deref()
            .is_some_and(|own| own.trim().to_lowercase() == name.to_lowercase());
        id_matches && name_matches
    }

    /// Display value for a field, or the placeholder when absent.
    pub fn display(value: &Option<String>) -> &str {
        value.as_deref().unwrap_or(NOT_PROVIDED)
    }
}

impl TryFrom<Value> for PatientRecord {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            Value::Null => Err(RecordError::NotAnObject("null")),
            Value::Bool(_) => Err(RecordError::NotAnObject("a boolean")),
            Value::Number(_) => Err(RecordError::NotAnObject("a number")),
            Value::String(_) => Err(RecordError::NotAnObject("a string")),
            Value::Array(_) => Err(RecordError::NotAnObject("an array")),
        }
    }
}

impl From<PatientRecord> for Value {
    fn from(record: PatientRecord) -> Self {
        Value::Object(record.source)
    }
}

/// Render a scalar JSON value as display text. Null and containers have none.
fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> PatientRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_scalars_become_display_text() {
        let r = record(json!({"id": "P1", "name": "Jane Doe", "age": 40, "gender": "F"}));
        assert_eq!(r.id.as_deref(), Some("P1"));
        assert_eq!(r.age.as_deref(), Some("40"));
        assert_eq!(r.address, None);
        assert_eq!(PatientRecord::display(&r.address), NOT_PROVIDED);
    }

    #[test]
    fn test_null_and_nested_values_are_absent() {
        let r = record(json!({"id": "P1", "address": null, "gender": {"code": "F"}}));
        assert_eq!(r.address, None);
        assert_eq!(r.gender, None);
    }

    #[test]
    fn test_extra_fields_pass_through() {
        let r = record(json!({"id": "P1", "final_diagnosis": "Pneumonia", "labs": [1, 2]}));
        assert_eq!(r.field("final_diagnosis"), Some(&json!("Pneumonia")));
        let back = serde_json::to_value(&r).unwrap();
        assert_eq!(back, json!({"id": "P1", "final_diagnosis": "Pneumonia", "labs": [1, 2]}));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = serde_json::from_value::<PatientRecord>(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_matching_rules() {
        let r = record(json!({"id": " P1 ", "name": "Jane Doe"}));
        assert!(r.matches("P1", "jane doe"));
        assert!(r.matches("  P1", "  JANE DOE  "));
        assert!(!r.matches("p1", "Jane Doe"));
        assert!(!r.matches("P1", "Jane"));
        assert!(!r.matches("", "Jane Doe"));
    }

    #[test]
    fn test_record_without_id_never_matches() {
        let r = record(json!({"name": "Jane Doe"}));
        assert!(!r.matches("P1", "Jane Doe"));
    }
}

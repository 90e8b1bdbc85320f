//! Patient dataset loading and lookup.

use crate::record::PatientRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read patient data {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse patient data {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only set of patient records, in dataset order.
#[derive(Debug, Clone, Default)]
pub struct PatientStore {
    records: Vec<PatientRecord>,
}

impl PatientStore {
    /// Wrap records that are already in memory.
    pub fn new(records: Vec<PatientRecord>) -> Self {
        Self { records }
    }

    /// Load a JSON array of patient objects.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<PatientRecord> =
            serde_json::from_str(&content).map_err(|source| StoreError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self::new(records);
        debug!(path = %path.display(), records = store.len(), "loaded patient data");
        for id in store.duplicate_ids() {
            warn!(%id, "patient ID appears more than once; lookups use the first entry");
        }
        Ok(store)
    }

    /// Load the dataset, degrading to an empty store when it cannot be read.
    ///
    /// The error is handed back so the caller can tell the user.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> (Self, Option<StoreError>) {
        match Self::load(path) {
            Ok(store) => (store, None),
            Err(e) => {
                warn!(error = %e, "patient data unavailable");
                (Self::default(), Some(e))
            }
        }
    }

    /// First record, in dataset order, whose ID and name both match.
    pub fn find(&self, id: &str, name: &str) -> Option<&PatientRecord> {
        self.records.iter().find(|record| record.matches(id, name))
    }

    /// Trimmed IDs that occur on more than one record, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();
        for id in self.records.iter().filter_map(|r| r.id.as_deref()) {
            let id = id.trim();
            let count = seen.entry(id).or_insert(0);
            *count += 1;
            if *count == 2 {
                order.push(id.to_string());
            }
        }
        order
    }

    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn store(value: serde_json::Value) -> PatientStore {
        PatientStore::new(serde_json::from_value(value).unwrap())
    }

    fn sample() -> PatientStore {
        store(json!([
            {"id": "P1", "name": "Jane Doe", "age": 40},
            {"id": "P2", "name": "John Roe", "age": 51},
            {"id": "P3", "name": "Asha Rao"},
        ]))
    }

    #[test]
    fn test_every_record_is_found_by_its_own_keys() {
        let s = sample();
        for record in s.records() {
            let id = record.id.as_deref().unwrap();
            let name = record.name.as_deref().unwrap();
            assert_eq!(s.find(id, name), Some(record));
            assert_eq!(s.find(&format!(" {id} "), &name.to_uppercase()), Some(record));
        }
    }

    #[test]
    fn test_unmatched_pairs_are_not_found() {
        let s = sample();
        assert!(s.find("P1", "John Roe").is_none());
        assert!(s.find("P9", "Jane Doe").is_none());
        assert!(s.find("", "").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let s = store(json!([
            {"id": "P1", "name": "Jane Doe", "age": 40},
            {"id": "P1", "name": "Jane Doe", "age": 41},
        ]));
        assert_eq!(s.find("P1", "jane doe").unwrap().age.as_deref(), Some("40"));
        assert_eq!(s.duplicate_ids(), vec!["P1".to_string()]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "P1", "name": "Jane Doe"}}]"#).unwrap();
        let s = PatientStore::load(file.path()).unwrap();
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let (s, err) = PatientStore::load_or_empty("/nonexistent/patients_data.json");
        assert!(s.is_empty());
        assert!(matches!(err, Some(StoreError::ReadError { .. })));
    }

    #[test]
    fn test_malformed_file_degrades_to_empty() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "P1"}}, 42]"#).unwrap();
        let (s, err) = PatientStore::load_or_empty(file.path());
        assert!(s.is_empty());
        assert!(matches!(err, Some(StoreError::ParseError { .. })));
    }
}

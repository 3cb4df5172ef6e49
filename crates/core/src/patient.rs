//! Patients dataset: rows keyed by `Patient_ID`.
//!
//! Apart from the key, patient columns are free-form demographics and are kept as-is.

use crate::constants::PATIENT_ID_COLUMN;
use crate::dataset::{read_records, Record};
use crate::error::Dataset;
use crate::{ReportError, ReportResult};
use riskview_types::PatientId;
use std::collections::HashSet;
use std::path::Path;

/// One row of the patients dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    id: PatientId,
    fields: Record,
}

impl Patient {
    pub fn from_record(fields: Record, row: usize) -> ReportResult<Self> {
        let id = PatientId::new(fields.require_i64(Dataset::Patients, row, PATIENT_ID_COLUMN)?);
        Ok(Self { id, fields })
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }
}

/// All rows of the patients dataset.
///
/// Rows are kept raw; a row whose `Patient_ID` is not an integer can never match a lookup and
/// does not affect the others.
#[derive(Debug, Clone, Default)]
pub struct PatientTable {
    rows: Vec<Record>,
}

fn row_key(row: &Record) -> Option<i64> {
    row.get(PATIENT_ID_COLUMN).and_then(|v| v.as_i64())
}

impl PatientTable {
    /// Load the patients dataset.
    ///
    /// # Errors
    ///
    /// Returns a `ReportError` if the file cannot be read or has no `Patient_ID` column.
    pub fn load(path: &Path) -> ReportResult<Self> {
        let rows = read_records(path, Dataset::Patients, &[PATIENT_ID_COLUMN])?;

        let mut seen = HashSet::new();
        for key in rows.iter().filter_map(row_key) {
            if !seen.insert(key) {
                tracing::warn!("duplicate {} {}; last row wins", PATIENT_ID_COLUMN, key);
            }
        }

        Ok(Self { rows })
    }

    /// The last row with an exactly matching `Patient_ID`.
    pub fn find(&self, id: PatientId) -> Option<Patient> {
        self.rows
            .iter()
            .rev()
            .find(|row| row_key(row) == Some(id.get()))
            .map(|row| Patient {
                id,
                fields: row.clone(),
            })
    }

    /// Validation errors of every row, for offline dataset checks.
    pub fn invalid_rows(&self) -> Vec<ReportError> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| Patient::from_record(row.clone(), i + 1).err())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FieldValue;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_and_find_patient() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("Patient.csv");
        fs::write(&path, "Patient_ID,name\n3,Jane\n4,Omar\n").unwrap();

        let table = PatientTable::load(&path).expect("load should succeed");
        assert_eq!(table.len(), 2);

        let patient = table.find(PatientId::new(3)).expect("patient 3");
        assert_eq!(patient.id(), PatientId::new(3));
        assert_eq!(
            patient.fields().get("name"),
            Some(&FieldValue::Text("Jane".into()))
        );
        assert!(table.find(PatientId::new(99)).is_none());
    }

    #[test]
    fn test_duplicate_ids_resolve_to_last_row() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("Patient.csv");
        fs::write(&path, "Patient_ID,name\n3,Jane\n3,Janet\n").unwrap();

        let table = PatientTable::load(&path).expect("load should succeed");
        let patient = table.find(PatientId::new(3)).unwrap();
        assert_eq!(
            patient.fields().get("name"),
            Some(&FieldValue::Text("Janet".into()))
        );
    }

    #[test]
    fn test_malformed_key_does_not_hide_other_rows() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("Patient.csv");
        fs::write(&path, "Patient_ID,name\n3,Jane\n,Ghost\nP-4,Omar\n").unwrap();

        let table = PatientTable::load(&path).expect("load should succeed");
        assert!(table.find(PatientId::new(3)).is_some());

        let invalid = table.invalid_rows();
        assert_eq!(invalid.len(), 2);
        assert!(matches!(
            invalid[0],
            ReportError::InvalidField {
                row: 2,
                column: "Patient_ID",
                ..
            }
        ));
    }
}

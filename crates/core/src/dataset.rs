//! CSV dataset loading.
//!
//! Each row is kept as an ordered field mapping so reports can show every column the dataset
//! carries, not only the ones the service interprets. Cell types are inferred per cell.

use crate::error::Dataset;
use crate::{ReportError, ReportResult};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::path::Path;

/// A single CSV cell with its inferred type.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    /// An empty cell. Serialises as `null`.
    Empty,
}

impl FieldValue {
    /// Infer the type of a raw cell: integer, then float, then boolean, falling back to text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Empty;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return FieldValue::Integer(value);
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            return FieldValue::Float(value);
        }
        match trimmed {
            "True" | "true" | "TRUE" => FieldValue::Boolean(true),
            "False" | "false" | "FALSE" => FieldValue::Boolean(false),
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    /// Integer view of the value. Whole floats (`3.0`) and booleans convert; anything else does not.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            FieldValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            FieldValue::Boolean(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Boolean(v) => Some(f64::from(u8::from(*v))),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Boolean(v) => write!(f, "{v}"),
            FieldValue::Text(v) => f.write_str(v),
            FieldValue::Empty => Ok(()),
        }
    }
}

/// One dataset row as an ordered column → value mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(fields: Vec<(String, FieldValue)>) -> Self {
        Self { fields }
    }

    fn from_row(headers: &csv::StringRecord, row: &csv::StringRecord) -> Self {
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(column, raw)| (column.to_string(), FieldValue::parse(raw)))
            .collect();
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Integer value of a required column, failing with `InvalidField` when it does not convert.
    pub(crate) fn require_i64(
        &self,
        dataset: Dataset,
        row: usize,
        column: &'static str,
    ) -> ReportResult<i64> {
        let value = self.required(dataset, column)?;
        value.as_i64().ok_or_else(|| ReportError::InvalidField {
            dataset,
            row,
            column,
            value: value.to_string(),
        })
    }

    pub(crate) fn require_f64(
        &self,
        dataset: Dataset,
        row: usize,
        column: &'static str,
    ) -> ReportResult<f64> {
        let value = self.required(dataset, column)?;
        value.as_f64().ok_or_else(|| ReportError::InvalidField {
            dataset,
            row,
            column,
            value: value.to_string(),
        })
    }

    fn required(&self, dataset: Dataset, column: &'static str) -> ReportResult<&FieldValue> {
        self.get(column)
            .ok_or(ReportError::MissingColumn { dataset, column })
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Read every row of a CSV dataset with a header row.
///
/// The header must contain each of `required_columns`; a missing column fails here, before any
/// row is looked at.
///
/// # Errors
///
/// Returns `ReportError::DatasetRead` if the file cannot be opened or parsed, and
/// `ReportError::MissingColumn` if a required column is absent from the header.
pub fn read_records(
    path: &Path,
    dataset: Dataset,
    required_columns: &[&'static str],
) -> ReportResult<Vec<Record>> {
    let read_error = |source| ReportError::DatasetRead {
        dataset,
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(read_error)?;
    let headers = reader.headers().map_err(read_error)?.clone();

    for column in required_columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(ReportError::MissingColumn {
                dataset,
                column,
            });
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(read_error)?;
        records.push(Record::from_row(&headers, &row));
    }

    tracing::debug!(
        "loaded {} dataset from {} ({} rows)",
        dataset,
        path.display(),
        records.len()
    );
    Ok(records)
}

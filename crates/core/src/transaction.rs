//! Transactions dataset: typed rows and lookup by `Transaction_ID`.

use crate::constants::{
    COVARIATE_COLUMNS, PATIENT_ID_COLUMN, PREMIUM_COLUMN, PREMIUM_REQUESTED, TRANSACTION_ID_COLUMN,
};
use crate::dataset::{read_records, Record};
use crate::error::Dataset;
use crate::{ReportError, ReportResult};
use riskview_types::{PatientId, TransactionId};
use std::collections::HashSet;
use std::path::Path;

/// The thirteen clinical covariates of a transaction, ordered as `COVARIATE_COLUMNS`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CovariateVector([f64; COVARIATE_COLUMNS.len()]);

impl CovariateVector {
    pub fn values(&self) -> &[f64; COVARIATE_COLUMNS.len()] {
        &self.0
    }

    /// Value of a covariate by column name.
    pub fn get(&self, column: &str) -> Option<f64> {
        COVARIATE_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|i| self.0[i])
    }
}

/// One row of the transactions dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    patient_id: PatientId,
    premium: i64,
    covariates: CovariateVector,
    fields: Record,
}

impl Transaction {
    /// Columns every transactions dataset must carry.
    pub fn required_columns() -> Vec<&'static str> {
        [TRANSACTION_ID_COLUMN, PATIENT_ID_COLUMN, PREMIUM_COLUMN]
            .into_iter()
            .chain(COVARIATE_COLUMNS)
            .collect()
    }

    /// Validate a raw row. `row` is the 1-based data row number used in error messages.
    pub fn from_record(fields: Record, row: usize) -> ReportResult<Self> {
        let dataset = Dataset::Transactions;
        let id = TransactionId::new(fields.require_i64(dataset, row, TRANSACTION_ID_COLUMN)?);
        let patient_id = PatientId::new(fields.require_i64(dataset, row, PATIENT_ID_COLUMN)?);
        let premium = fields.require_i64(dataset, row, PREMIUM_COLUMN)?;

        let mut covariates = [0.0; COVARIATE_COLUMNS.len()];
        for (slot, column) in covariates.iter_mut().zip(COVARIATE_COLUMNS) {
            *slot = fields.require_f64(dataset, row, column)?;
        }

        Ok(Self {
            id,
            patient_id,
            premium,
            covariates: CovariateVector(covariates),
            fields,
        })
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    pub fn premium(&self) -> i64 {
        self.premium
    }

    /// Whether the enhanced analysis was purchased for this transaction.
    pub fn is_premium(&self) -> bool {
        self.premium == PREMIUM_REQUESTED
    }

    pub fn covariates(&self) -> &CovariateVector {
        &self.covariates
    }

    /// Every column of the row, in dataset order.
    pub fn fields(&self) -> &Record {
        &self.fields
    }
}

/// All rows of the transactions dataset.
///
/// Only the header is validated when loading. A row is turned into a typed `Transaction` when it
/// is looked up, so a malformed row only affects requests for that row.
#[derive(Debug, Clone, Default)]
pub struct TransactionTable {
    rows: Vec<Record>,
}

fn row_key(row: &Record) -> Option<i64> {
    row.get(TRANSACTION_ID_COLUMN).and_then(|v| v.as_i64())
}

impl TransactionTable {
    /// Load the transactions dataset.
    ///
    /// # Errors
    ///
    /// Returns a `ReportError` if the file cannot be read or a required column is missing.
    pub fn load(path: &Path) -> ReportResult<Self> {
        let rows = read_records(path, Dataset::Transactions, &Transaction::required_columns())?;

        let mut seen = HashSet::new();
        for key in rows.iter().filter_map(row_key) {
            if !seen.insert(key) {
                tracing::warn!("duplicate {} {}; last row wins", TRANSACTION_ID_COLUMN, key);
            }
        }

        Ok(Self { rows })
    }

    /// The last row with an exactly matching `Transaction_ID`, validated.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidField` if the matched row has a non-numeric required cell.
    pub fn find(&self, id: TransactionId) -> ReportResult<Option<Transaction>> {
        self.rows
            .iter()
            .enumerate()
            .rev()
            .find(|(_, row)| row_key(row) == Some(id.get()))
            .map(|(i, row)| Transaction::from_record(row.clone(), i + 1))
            .transpose()
    }

    /// Validation errors of every row, for offline dataset checks.
    pub fn invalid_rows(&self) -> Vec<ReportError> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| Transaction::from_record(row.clone(), i + 1).err())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

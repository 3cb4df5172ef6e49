use riskview_types::{IdError, PatientId, TransactionId};
use std::fmt;

/// The two tabular datasets the service reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Patients,
    Transactions,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::Patients => f.write_str("patients"),
            Dataset::Transactions => f.write_str("transactions"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid transaction id: {0}")]
    InvalidTransactionId(#[from] IdError),
    #[error("transaction {0} not found")]
    TransactionNotFound(TransactionId),
    #[error("patient {patient_id} referenced by transaction {transaction_id} not found")]
    PatientNotFound {
        transaction_id: TransactionId,
        patient_id: PatientId,
    },

    #[error("failed to read {dataset} dataset (path: {path}): {source}", path = path.display())]
    DatasetRead {
        dataset: Dataset,
        path: std::path::PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{dataset} dataset is missing required column {column:?}")]
    MissingColumn {
        dataset: Dataset,
        column: &'static str,
    },
    #[error("{dataset} dataset row {row}: column {column:?} has invalid value {value:?}")]
    InvalidField {
        dataset: Dataset,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("failed to build scoring client: {0}")]
    ScoringClient(reqwest::Error),
    #[error("scoring request failed: {0}")]
    ScoringRequest(reqwest::Error),
    #[error("invalid scoring response: {0}")]
    ScoringResponse(String),
}

impl ReportError {
    /// True for the one outcome callers render as a not-found view: the transaction exists
    /// but its patient reference has no row in the patients dataset.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReportError::PatientNotFound { .. })
    }
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;

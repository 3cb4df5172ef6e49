//! Constants used throughout the riskview core crate.
//!
//! Column names match the headers of the CSV datasets exactly, including the
//! dataset's own spelling of the premium column.

/// Default directory holding the two CSV datasets.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Filename of the patients dataset.
pub const PATIENTS_FILENAME: &str = "Patient.csv";

/// Filename of the transactions dataset.
pub const TRANSACTIONS_FILENAME: &str = "Transactions.csv";

/// Key column of the transactions dataset.
pub const TRANSACTION_ID_COLUMN: &str = "Transaction_ID";

/// Key column of the patients dataset, and the patient reference column of the transactions dataset.
pub const PATIENT_ID_COLUMN: &str = "Patient_ID";

/// Premium-service flag column of the transactions dataset.
pub const PREMIUM_COLUMN: &str = "Premieum";

/// Premium flag value meaning the enhanced analysis was purchased.
pub const PREMIUM_REQUESTED: i64 = 1;

/// Clinical covariates in the order the scoring model consumes them.
pub const COVARIATE_COLUMNS: [&str; 13] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Scoring outcome meaning no risk was detected.
pub const NO_RISK_OUTCOME: i64 = 0;

/// Summary shown when the premium analysis finds no risk.
pub const NO_RISK_SUMMARY: &str = "Based on the provided patient data, our analysis indicates no \
significant risk of heart attack. However, we recommend routine follow-ups and monitoring to \
ensure continued health.";

/// Summary shown when the premium analysis flags a potential risk.
pub const POTENTIAL_RISK_SUMMARY: &str = "Based on the provided patient data, our analysis \
indicates a potential risk of heart attack. We recommend clinical verification and correlation \
with additional diagnostic findings for accurate assessment.";

/// Summary shown when the premium analysis was not purchased.
pub const PREMIUM_NOT_REQUESTED_SUMMARY: &str =
    "PREMIUM SERVICE WAS NOT REQUESTED FOR THIS TRANSACTION";

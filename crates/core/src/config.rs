//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads environment variables, and the
//! TLS verification choice for the scoring client lives here rather than in process-wide state.

use crate::constants::{DEFAULT_DATA_DIR, PATIENTS_FILENAME, TRANSACTIONS_FILENAME};
use crate::{ReportError, ReportResult};
use std::path::{Path, PathBuf};

/// Settings for the risk scorer.
///
/// With no endpoint the constant scorer is used.
#[derive(Clone, Debug, Default)]
pub struct ScoringConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Accept self-signed certificates from the scoring endpoint.
    pub allow_self_signed_https: bool,
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    patients_filename: String,
    transactions_filename: String,
    scoring: ScoringConfig,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidInput` if either dataset filename is empty.
    pub fn new(
        data_dir: PathBuf,
        patients_filename: String,
        transactions_filename: String,
        scoring: ScoringConfig,
    ) -> ReportResult<Self> {
        if patients_filename.trim().is_empty() {
            return Err(ReportError::InvalidInput(
                "patients filename cannot be empty".into(),
            ));
        }
        if transactions_filename.trim().is_empty() {
            return Err(ReportError::InvalidInput(
                "transactions filename cannot be empty".into(),
            ));
        }

        Ok(Self {
            data_dir,
            patients_filename,
            transactions_filename,
            scoring,
        })
    }

    /// Configuration with the default dataset filenames under `data_dir` and the constant scorer.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            patients_filename: PATIENTS_FILENAME.into(),
            transactions_filename: TRANSACTIONS_FILENAME.into(),
            scoring: ScoringConfig::default(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn patients_path(&self) -> PathBuf {
        self.data_dir.join(&self.patients_filename)
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.data_dir.join(&self.transactions_filename)
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR)
    }
}

/// Parse a boolean flag from an optional environment value.
///
/// `None` or empty/whitespace yields `false`. Accepts `1/0`, `true/false`, `yes/no`, `on/off`
/// in any case.
pub fn flag_from_env_value(name: &str, value: Option<String>) -> ReportResult<bool> {
    let Some(value) = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
    else {
        return Ok(false);
    };

    match value.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ReportError::InvalidInput(format!(
            "{name} must be a boolean flag, got {other:?}"
        ))),
    }
}

/// Normalise an optional environment value: trimmed, and `None` when empty.
pub fn optional_from_env_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

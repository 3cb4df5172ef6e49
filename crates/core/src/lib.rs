//! # Riskview Core
//!
//! Core logic for the cardiac risk report service.
//!
//! This crate contains pure data operations:
//! - Loading the patients and transactions CSV datasets into typed rows
//! - Joining a transaction with its patient
//! - Choosing the analysis summary, via a pluggable risk scorer
//!
//! **No API concerns**: HTTP routing, HTML rendering and process startup belong in `api-rest`
//! and the `riskview-run` binary.

pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod patient;
pub mod report;
pub mod scoring;
pub mod transaction;

pub use config::{CoreConfig, ScoringConfig};
pub use constants::DEFAULT_DATA_DIR;
pub use dataset::{FieldValue, Record};
pub use error::{Dataset, ReportError, ReportResult};
pub use patient::{Patient, PatientTable};
pub use report::{Report, ReportAssembler};
pub use scoring::{scorer_from_config, ConstantScorer, RemoteScorer, RiskLabel, RiskScorer};
pub use transaction::{Transaction, TransactionTable};

pub use riskview_types::{IdError, PatientId, TransactionId};

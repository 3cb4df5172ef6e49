//! Report assembly.
//!
//! Joins one transaction with its patient and picks the summary text. Both datasets are read
//! from disk on every call, so edits to the CSV files show up on the next request.

use crate::constants::PREMIUM_NOT_REQUESTED_SUMMARY;
use crate::dataset::Record;
use crate::patient::PatientTable;
use crate::scoring::{RiskScorer, ScoringRequest};
use crate::transaction::{Transaction, TransactionTable};
use crate::{CoreConfig, ReportError, ReportResult};
use riskview_types::TransactionId;
use serde::Serialize;
use std::sync::Arc;

/// The combined view handed to the renderer. Built per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub patient_details: Record,
    pub transaction: Record,
    pub analysis_summary: String,
}

/// Builds reports from the configured datasets.
#[derive(Clone)]
pub struct ReportAssembler {
    cfg: Arc<CoreConfig>,
    scorer: Arc<dyn RiskScorer>,
}

impl ReportAssembler {
    pub fn new(cfg: Arc<CoreConfig>, scorer: Arc<dyn RiskScorer>) -> Self {
        Self { cfg, scorer }
    }

    /// Assemble the report for one transaction.
    ///
    /// # Errors
    ///
    /// - `ReportError::TransactionNotFound` if no transaction row has this id.
    /// - `ReportError::PatientNotFound` if the transaction's `Patient_ID` has no patient row.
    /// - Dataset errors if either file is missing or lacks a required column, or if the matched
    ///   transaction row has a non-numeric required cell. Other rows are not validated.
    /// - Scoring errors if the premium analysis fails.
    #[tracing::instrument(skip(self))]
    pub async fn assemble(&self, transaction_id: TransactionId) -> ReportResult<Report> {
        let patients = PatientTable::load(&self.cfg.patients_path())?;
        let transactions = TransactionTable::load(&self.cfg.transactions_path())?;

        let transaction = transactions
            .find(transaction_id)?
            .ok_or(ReportError::TransactionNotFound(transaction_id))?;
        tracing::debug!("matched transaction {}: {:?}", transaction.id(), transaction.fields());

        let patient =
            patients
                .find(transaction.patient_id())
                .ok_or(ReportError::PatientNotFound {
                    transaction_id,
                    patient_id: transaction.patient_id(),
                })?;

        let request = ScoringRequest::for_transaction(&transaction);
        let analysis_summary = self.summarise(&transaction, &request).await?;

        tracing::info!(
            "assembled report for transaction {} (patient {}, premium {})",
            transaction_id,
            patient.id(),
            transaction.premium()
        );

        Ok(Report {
            patient_details: patient.fields().clone(),
            transaction: transaction.fields().clone(),
            analysis_summary: analysis_summary.to_string(),
        })
    }

    /// Assemble from the string form of the id, as submitted by a form or on the command line.
    pub async fn assemble_str(&self, raw_transaction_id: &str) -> ReportResult<Report> {
        let transaction_id: TransactionId = raw_transaction_id.parse()?;
        self.assemble(transaction_id).await
    }

    /// Summary text for a transaction. The scorer is only consulted for premium transactions.
    pub async fn summarise(
        &self,
        transaction: &Transaction,
        request: &ScoringRequest,
    ) -> ReportResult<&'static str> {
        if !transaction.is_premium() {
            return Ok(PREMIUM_NOT_REQUESTED_SUMMARY);
        }
        let label = self.scorer.score(request).await?;
        Ok(label.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{NO_RISK_SUMMARY, POTENTIAL_RISK_SUMMARY};
    use crate::dataset::FieldValue;
    use crate::scoring::{ConstantScorer, RiskLabel, ScoreFuture};
    use riskview_types::PatientId;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const TRANSACTIONS: &str = "\
Transaction_ID,Patient_ID,Premieum,age,sex,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal
7,3,1,54,1,0,130,250,0,1,187,0,3.5,0,0,2
8,99,0,61,0,2,140,298,1,1,120,1,1.8,1,2,3
9,3,0,48,1,1,120,230,0,0,160,0,0.4,2,0,2
";

    const PATIENTS: &str = "\
Patient_ID,name
3,Jane
";

    fn write_datasets(dir: &Path) {
        fs::write(dir.join("Transactions.csv"), TRANSACTIONS).expect("write transactions");
        fs::write(dir.join("Patient.csv"), PATIENTS).expect("write patients");
    }

    fn test_assembler(dir: &Path, scorer: Arc<dyn RiskScorer>) -> ReportAssembler {
        ReportAssembler::new(Arc::new(CoreConfig::with_data_dir(dir)), scorer)
    }

    /// Counts calls and always reports a potential risk.
    #[derive(Default)]
    struct CountingScorer {
        calls: AtomicUsize,
    }

    impl RiskScorer for CountingScorer {
        fn score<'a>(&'a self, _request: &'a ScoringRequest) -> ScoreFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(RiskLabel::PotentialRisk) })
        }
    }

    #[tokio::test]
    async fn test_assemble_joins_transaction_and_patient() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_datasets(temp_dir.path());
        let assembler = test_assembler(temp_dir.path(), Arc::new(ConstantScorer::default()));

        let report = assembler
            .assemble(TransactionId::new(7))
            .await
            .expect("assemble should succeed");

        let expected_patient = Record::new(vec![
            ("Patient_ID".into(), FieldValue::Integer(3)),
            ("name".into(), FieldValue::Text("Jane".into())),
        ]);
        assert_eq!(report.patient_details, expected_patient);
        assert_eq!(report.transaction.get("age"), Some(&FieldValue::Integer(54)));
        assert_eq!(report.transaction.len(), 16);
        assert_eq!(report.analysis_summary, NO_RISK_SUMMARY);
    }

    #[tokio::test]
    async fn test_assemble_reports_missing_patient_as_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_datasets(temp_dir.path());
        let assembler = test_assembler(temp_dir.path(), Arc::new(ConstantScorer::default()));

        let err = assembler.assemble(TransactionId::new(8)).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(
            err,
            ReportError::PatientNotFound { patient_id, .. } if patient_id == PatientId::new(99)
        ));
    }

    #[tokio::test]
    async fn test_assemble_unknown_transaction_is_not_the_not_found_outcome() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_datasets(temp_dir.path());
        let assembler = test_assembler(temp_dir.path(), Arc::new(ConstantScorer::default()));

        let err = assembler.assemble(TransactionId::new(1234)).await.unwrap_err();

        assert!(matches!(err, ReportError::TransactionNotFound(_)));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_non_premium_summary_skips_scorer() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_datasets(temp_dir.path());
        let scorer = Arc::new(CountingScorer::default());
        let assembler = test_assembler(temp_dir.path(), scorer.clone());

        let report = assembler
            .assemble(TransactionId::new(9))
            .await
            .expect("assemble should succeed");

        assert_eq!(report.analysis_summary, PREMIUM_NOT_REQUESTED_SUMMARY);
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_premium_summary_follows_scorer_label() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_datasets(temp_dir.path());
        let scorer = Arc::new(CountingScorer::default());
        let assembler = test_assembler(temp_dir.path(), scorer.clone());

        let report = assembler
            .assemble(TransactionId::new(7))
            .await
            .expect("assemble should succeed");

        assert_eq!(report.analysis_summary, POTENTIAL_RISK_SUMMARY);
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_assemble_str_rejects_malformed_id() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_datasets(temp_dir.path());
        let assembler = test_assembler(temp_dir.path(), Arc::new(ConstantScorer::default()));

        let err = assembler.assemble_str("seven").await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidTransactionId(_)));

        let report = assembler.assemble_str(" 7 ").await.expect("trimmed id");
        assert_eq!(report.analysis_summary, NO_RISK_SUMMARY);
    }

    #[tokio::test]
    async fn test_assemble_rereads_datasets_each_call() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        write_datasets(temp_dir.path());
        let assembler = test_assembler(temp_dir.path(), Arc::new(ConstantScorer::default()));

        assert!(assembler.assemble(TransactionId::new(8)).await.is_err());

        fs::write(temp_dir.path().join("Patient.csv"), "Patient_ID,name\n3,Jane\n99,Ravi\n")
            .expect("rewrite patients");
        let report = assembler
            .assemble(TransactionId::new(8))
            .await
            .expect("patient 99 now exists");
        assert_eq!(
            report.patient_details.get("name"),
            Some(&FieldValue::Text("Ravi".into()))
        );
    }

    #[tokio::test]
    async fn test_malformed_unrelated_rows_do_not_block_report() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(
            temp_dir.path().join("Transactions.csv"),
            format!("{TRANSACTIONS}10,3,0,61,0,2,140,298,1,1,120,1,1.8,1,,3\n"),
        )
        .expect("write transactions");
        fs::write(temp_dir.path().join("Patient.csv"), "Patient_ID,name\n3,Jane\n,Ghost\n")
            .expect("write patients");
        let assembler = test_assembler(temp_dir.path(), Arc::new(ConstantScorer::default()));

        let report = assembler
            .assemble(TransactionId::new(7))
            .await
            .expect("row 7 and patient 3 are valid");

        assert_eq!(
            report.patient_details.get("name"),
            Some(&FieldValue::Text("Jane".into()))
        );
        assert_eq!(report.analysis_summary, NO_RISK_SUMMARY);
    }

    #[tokio::test]
    async fn test_duplicate_transaction_rows_use_last_match() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(
            temp_dir.path().join("Transactions.csv"),
            format!("{TRANSACTIONS}7,4,1,60,1,0,130,250,0,1,187,0,3.5,0,0,2\n"),
        )
        .expect("write transactions");
        fs::write(temp_dir.path().join("Patient.csv"), "Patient_ID,name\n3,Jane\n4,Omar\n")
            .expect("write patients");
        let assembler = test_assembler(temp_dir.path(), Arc::new(ConstantScorer::default()));

        let report = assembler
            .assemble(TransactionId::new(7))
            .await
            .expect("assemble should succeed");

        assert_eq!(report.transaction.get("age"), Some(&FieldValue::Integer(60)));
        assert_eq!(
            report.patient_details.get("name"),
            Some(&FieldValue::Text("Omar".into()))
        );
    }

    #[tokio::test]
    async fn test_assemble_fails_when_dataset_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let assembler = test_assembler(temp_dir.path(), Arc::new(ConstantScorer::default()));

        let err = assembler.assemble(TransactionId::new(7)).await.unwrap_err();
        assert!(matches!(err, ReportError::DatasetRead { .. }));
    }
}

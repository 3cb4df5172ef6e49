use clap::{Parser, Subcommand};
use riskview_core::constants::{PATIENTS_FILENAME, TRANSACTIONS_FILENAME};
use riskview_core::{
    scorer_from_config, CoreConfig, PatientTable, ReportAssembler, ScoringConfig,
    TransactionTable, DEFAULT_DATA_DIR,
};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "riskview")]
#[command(about = "Riskview cardiac risk report CLI")]
struct Cli {
    /// Directory holding the patients and transactions datasets
    #[arg(long, global = true, env = "RISKVIEW_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Patients dataset filename inside the data directory
    #[arg(long, global = true, env = "RISKVIEW_PATIENTS_FILE", default_value = PATIENTS_FILENAME)]
    patients_file: String,
    /// Transactions dataset filename inside the data directory
    #[arg(long, global = true, env = "RISKVIEW_TRANSACTIONS_FILE", default_value = TRANSACTIONS_FILENAME)]
    transactions_file: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the report for a transaction as JSON
    Report {
        /// Transaction_ID to report on
        transaction_id: String,
        /// Scoring endpoint (optional; constant scorer when absent)
        #[arg(long, env = "RISKVIEW_SCORING_ENDPOINT")]
        scoring_endpoint: Option<String>,
        /// Bearer key for the scoring endpoint
        #[arg(long, env = "RISKVIEW_SCORING_API_KEY")]
        scoring_api_key: Option<String>,
        /// Accept self-signed certificates from the scoring endpoint
        #[arg(long, env = "RISKVIEW_ALLOW_SELF_SIGNED_HTTPS")]
        allow_self_signed_https: bool,
    },
    /// Load both datasets and validate every row
    Check,
}

/// How a command finished, mapped to the process exit code by `main`.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    /// The transaction's patient does not exist (exit code 2).
    NotFound,
    /// `check` found rows that would fail a lookup (exit code 1).
    InvalidRows(usize),
}

impl Cli {
    fn core_config(&self, scoring: ScoringConfig) -> Result<CoreConfig, Box<dyn Error>> {
        Ok(CoreConfig::new(
            self.data_dir.clone(),
            self.patients_file.clone(),
            self.transactions_file.clone(),
            scoring,
        )?)
    }
}

async fn run(cli: Cli) -> Result<Outcome, Box<dyn Error>> {
    match &cli.command {
        Some(Commands::Report {
            transaction_id,
            scoring_endpoint,
            scoring_api_key,
            allow_self_signed_https,
        }) => {
            let cfg = cli.core_config(ScoringConfig {
                endpoint: scoring_endpoint.clone(),
                api_key: scoring_api_key.clone(),
                allow_self_signed_https: *allow_self_signed_https,
            })?;
            let scorer = scorer_from_config(cfg.scoring())?;
            let assembler = ReportAssembler::new(Arc::new(cfg), scorer);

            match assembler.assemble_str(transaction_id).await {
                Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                Err(e) if e.is_not_found() => {
                    eprintln!("Not found: {}", e);
                    return Ok(Outcome::NotFound);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some(Commands::Check) => {
            let cfg = cli.core_config(ScoringConfig::default())?;
            let patients = PatientTable::load(&cfg.patients_path())?;
            let transactions = TransactionTable::load(&cfg.transactions_path())?;

            let invalid: Vec<_> = patients
                .invalid_rows()
                .into_iter()
                .chain(transactions.invalid_rows())
                .collect();
            for e in &invalid {
                eprintln!("Invalid: {}", e);
            }
            if !invalid.is_empty() {
                return Ok(Outcome::InvalidRows(invalid.len()));
            }

            println!(
                "OK: {} patients, {} transactions in {}",
                patients.len(),
                transactions.len(),
                cfg.data_dir().display()
            );
        }
        None => {
            println!("Use 'riskview --help' for commands");
        }
    }

    Ok(Outcome::Done)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    match run(Cli::parse()).await? {
        Outcome::Done => Ok(()),
        Outcome::NotFound => std::process::exit(2),
        Outcome::InvalidRows(_) => std::process::exit(1),
    }
}

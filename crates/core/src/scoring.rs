//! Risk scoring.
//!
//! The report only needs a risk label, so scoring sits behind the `RiskScorer` trait. The
//! default `ConstantScorer` always reports the same outcome; `RemoteScorer` posts the covariate
//! vector to an online model endpoint.

use crate::config::ScoringConfig;
use crate::constants::{
    COVARIATE_COLUMNS, NO_RISK_OUTCOME, NO_RISK_SUMMARY, POTENTIAL_RISK_SUMMARY,
};
use crate::transaction::Transaction;
use crate::{ReportError, ReportResult};
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Payload sent to a scoring model: column names plus one row of covariate values.
///
/// Serialises as `{"input_data": {"columns": [...], "data": [[...]]}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringRequest {
    input_data: InputData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct InputData {
    columns: [&'static str; COVARIATE_COLUMNS.len()],
    data: Vec<[f64; COVARIATE_COLUMNS.len()]>,
}

impl ScoringRequest {
    pub fn for_transaction(transaction: &Transaction) -> Self {
        Self {
            input_data: InputData {
                columns: COVARIATE_COLUMNS,
                data: vec![*transaction.covariates().values()],
            },
        }
    }
}

/// Outcome of a risk prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLabel {
    NoRisk,
    PotentialRisk,
}

impl RiskLabel {
    /// Map a model's numeric outcome: `0` is no risk, anything else is a potential risk.
    pub fn from_outcome(outcome: i64) -> Self {
        if outcome == NO_RISK_OUTCOME {
            RiskLabel::NoRisk
        } else {
            RiskLabel::PotentialRisk
        }
    }

    /// The summary text shown on a premium report.
    pub fn summary(self) -> &'static str {
        match self {
            RiskLabel::NoRisk => NO_RISK_SUMMARY,
            RiskLabel::PotentialRisk => POTENTIAL_RISK_SUMMARY,
        }
    }
}

pub type ScoreFuture<'a> = Pin<Box<dyn Future<Output = ReportResult<RiskLabel>> + Send + 'a>>;

/// Something that can turn a covariate vector into a risk label.
pub trait RiskScorer: Send + Sync {
    fn score<'a>(&'a self, request: &'a ScoringRequest) -> ScoreFuture<'a>;
}

/// Scorer that ignores its input and returns a fixed outcome.
#[derive(Debug, Clone, Copy)]
pub struct ConstantScorer {
    outcome: i64,
}

impl ConstantScorer {
    pub fn new(outcome: i64) -> Self {
        Self { outcome }
    }
}

impl Default for ConstantScorer {
    fn default() -> Self {
        Self::new(NO_RISK_OUTCOME)
    }
}

impl RiskScorer for ConstantScorer {
    fn score<'a>(&'a self, _request: &'a ScoringRequest) -> ScoreFuture<'a> {
        let label = RiskLabel::from_outcome(self.outcome);
        Box::pin(async move { Ok(label) })
    }
}

/// Scorer backed by an HTTP model endpoint.
///
/// The endpoint receives the `ScoringRequest` JSON and must answer with a JSON array whose
/// first element is the numeric outcome, e.g. `[0]`.
#[derive(Debug, Clone)]
pub struct RemoteScorer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteScorer {
    /// Build the scorer and its HTTP client.
    ///
    /// Certificate verification is disabled on this client only, and only when
    /// `allow_self_signed_https` is set.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::ScoringClient` if the HTTP client cannot be built.
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        allow_self_signed_https: bool,
    ) -> ReportResult<Self> {
        if allow_self_signed_https {
            tracing::warn!(
                "scoring client accepts invalid TLS certificates from {}",
                endpoint
            );
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(allow_self_signed_https)
            .build()
            .map_err(ReportError::ScoringClient)?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    async fn post(&self, request: &ScoringRequest) -> ReportResult<RiskLabel> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ReportError::ScoringRequest)?;
        let body: Vec<serde_json::Value> =
            response.json().await.map_err(ReportError::ScoringRequest)?;

        let outcome = body
            .first()
            .and_then(outcome_from_value)
            .ok_or_else(|| {
                ReportError::ScoringResponse(format!("expected [outcome, ...], got {body:?}"))
            })?;

        tracing::debug!("scoring endpoint returned outcome {}", outcome);
        Ok(RiskLabel::from_outcome(outcome))
    }
}

fn outcome_from_value(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

impl RiskScorer for RemoteScorer {
    fn score<'a>(&'a self, request: &'a ScoringRequest) -> ScoreFuture<'a> {
        Box::pin(self.post(request))
    }
}

/// Pick the scorer described by the configuration.
pub fn scorer_from_config(cfg: &ScoringConfig) -> ReportResult<Arc<dyn RiskScorer>> {
    match &cfg.endpoint {
        Some(endpoint) => {
            tracing::info!("using remote scorer at {}", endpoint);
            Ok(Arc::new(RemoteScorer::new(
                endpoint.clone(),
                cfg.api_key.clone(),
                cfg.allow_self_signed_https,
            )?))
        }
        None => {
            tracing::info!("no scoring endpoint configured; using constant scorer");
            Ok(Arc::new(ConstantScorer::default()))
        }
    }
}

//! # API REST
//!
//! HTTP surface for riskview.
//!
//! Handles:
//! - the HTML form flow (`GET /`, `POST /analyze`) rendered with tera
//! - JSON endpoints with axum and OpenAPI/Swagger documentation
//! - REST-specific concerns (status mapping, CORS)
//!
//! All record lookup lives in `riskview-core`.

#![warn(rust_2018_idioms)]

pub mod views;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use riskview_core::{Record, Report, ReportAssembler, ReportError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub use views::Views;

/// Application state shared across handlers
///
/// Holds the report assembler and the compiled HTML views. Both are immutable.
#[derive(Clone)]
pub struct AppState {
    assembler: Arc<ReportAssembler>,
    views: Arc<Views>,
}

impl AppState {
    pub fn new(assembler: ReportAssembler, views: Views) -> Self {
        Self {
            assembler: Arc::new(assembler),
            views: Arc::new(views),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// JSON form of a report.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportRes {
    /// Every column of the patient row
    #[schema(value_type = Object)]
    pub patient_details: Record,
    /// Every column of the transaction row
    #[schema(value_type = Object)]
    pub transaction: Record,
    pub analysis_summary: String,
}

impl From<Report> for ReportRes {
    fn from(report: Report) -> Self {
        Self {
            patient_details: report.patient_details,
            transaction: report.transaction,
            analysis_summary: report.analysis_summary,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeForm {
    #[serde(rename = "transactionId")]
    transaction_id: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, report_json),
    components(schemas(HealthRes, ReportRes, ErrorRes))
)]
struct ApiDoc;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .route("/api/reports/:transaction_id", get(report_json))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Status for a failed report.
///
/// Only a missing patient is "not found". A malformed id is the caller's fault; everything
/// else, including an unknown transaction id, is a failed request.
fn failure_status(err: &ReportError) -> StatusCode {
    match err {
        ReportError::PatientNotFound { .. } => StatusCode::NOT_FOUND,
        ReportError::InvalidTransactionId(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn render(status: StatusCode, page: Result<String, tera::Error>) -> Response {
    match page {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template render error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

/// Landing page
#[axum::debug_handler]
async fn index(State(state): State<AppState>) -> Response {
    render(StatusCode::OK, state.views.index())
}

/// Analyze a transaction submitted from the landing page form
///
/// Renders the report view on success and the not-found view (404) when the transaction's
/// patient does not exist.
///
/// # Errors
/// - `400 Bad Request` if `transactionId` is not an integer.
/// - `500 Internal Server Error` if the transaction does not exist, a dataset cannot be read,
///   or scoring fails.
#[axum::debug_handler]
async fn analyze(State(state): State<AppState>, Form(form): Form<AnalyzeForm>) -> Response {
    match state.assembler.assemble_str(&form.transaction_id).await {
        Ok(report) => render(StatusCode::OK, state.views.report(&report)),
        Err(e) => match failure_status(&e) {
            StatusCode::NOT_FOUND => {
                tracing::info!("Analyze not found: {}", e);
                render(StatusCode::NOT_FOUND, state.views.error())
            }
            StatusCode::BAD_REQUEST => {
                tracing::info!("Analyze rejected: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid transaction id").into_response()
            }
            status => {
                tracing::error!("Analyze error: {:?}", e);
                (status, "Internal error").into_response()
            }
        },
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Returns a static liveness response. It does not touch the datasets.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Riskview is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/api/reports/{transaction_id}",
    params(
        ("transaction_id" = String, Path, description = "Transaction_ID of the transaction to report on")
    ),
    responses(
        (status = 200, description = "Assembled report", body = ReportRes),
        (status = 400, description = "Malformed transaction id", body = ErrorRes),
        (status = 404, description = "Patient referenced by the transaction not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Assemble a report as JSON
///
/// Same lookup as `POST /analyze`, returning the report data instead of the HTML view.
#[axum::debug_handler]
async fn report_json(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<ReportRes>, (StatusCode, Json<ErrorRes>)> {
    match state.assembler.assemble_str(&transaction_id).await {
        Ok(report) => Ok(Json(report.into())),
        Err(e) => {
            let status = failure_status(&e);
            let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!("Report error: {:?}", e);
                "Internal error".to_string()
            } else {
                e.to_string()
            };
            Err((status, Json(ErrorRes { error })))
        }
    }
}

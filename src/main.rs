use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, Views};
use riskview_core::config::{flag_from_env_value, optional_from_env_value};
use riskview_core::constants::{PATIENTS_FILENAME, TRANSACTIONS_FILENAME};
use riskview_core::{CoreConfig, ReportAssembler, ScoringConfig, scorer_from_config};

/// Main entry point for the riskview server
///
/// Resolves configuration from the environment once, then serves the HTML form flow and the
/// JSON API on a single address.
///
/// # Environment Variables
/// - `RISKVIEW_ADDR`: server address (default: "0.0.0.0:8099")
/// - `RISKVIEW_DATA_DIR`: directory holding the datasets (default: "data")
/// - `RISKVIEW_PATIENTS_FILE` / `RISKVIEW_TRANSACTIONS_FILE`: dataset filenames
/// - `RISKVIEW_SCORING_ENDPOINT`: model endpoint; the constant scorer is used when unset
/// - `RISKVIEW_SCORING_API_KEY`: bearer key for the model endpoint
/// - `RISKVIEW_ALLOW_SELF_SIGNED_HTTPS`: accept self-signed certificates from the endpoint
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a configuration value is invalid or the data directory does not exist,
/// - the templates fail to compile,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("riskview=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = std::env::var("RISKVIEW_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8099".into())
        .parse()?;

    let data_dir = PathBuf::from(
        std::env::var("RISKVIEW_DATA_DIR")
            .unwrap_or_else(|_| riskview_core::DEFAULT_DATA_DIR.into()),
    );
    if !data_dir.is_dir() {
        anyhow::bail!("Data directory does not exist: {}", data_dir.display());
    }

    let scoring = ScoringConfig {
        endpoint: optional_from_env_value(std::env::var("RISKVIEW_SCORING_ENDPOINT").ok()),
        api_key: optional_from_env_value(std::env::var("RISKVIEW_SCORING_API_KEY").ok()),
        allow_self_signed_https: flag_from_env_value(
            "RISKVIEW_ALLOW_SELF_SIGNED_HTTPS",
            std::env::var("RISKVIEW_ALLOW_SELF_SIGNED_HTTPS").ok(),
        )?,
    };

    let cfg = Arc::new(CoreConfig::new(
        data_dir,
        std::env::var("RISKVIEW_PATIENTS_FILE").unwrap_or_else(|_| PATIENTS_FILENAME.into()),
        std::env::var("RISKVIEW_TRANSACTIONS_FILE")
            .unwrap_or_else(|_| TRANSACTIONS_FILENAME.into()),
        scoring,
    )?);

    tracing::info!("++ Reading patients from {}", cfg.patients_path().display());
    tracing::info!(
        "++ Reading transactions from {}",
        cfg.transactions_path().display()
    );

    let scorer = scorer_from_config(cfg.scoring())?;
    let state = AppState::new(ReportAssembler::new(cfg, scorer), Views::new()?);
    let app = api_rest::router(state);

    tracing::info!("++ Starting riskview on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Salary Survey API
//!
//! Serves the survey answers produced by the `seed` crate and exposes the
//! filtered listing and the pay-range summary over a REST API using Axum.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::Method,
    routing::get,
};
use common::{PayRangeCount, SalaryRecord};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod query;

use config::Config;
use error::ApiError;
use query::{SUMMARY_LIMIT, SalaryQuery, pay_range_summary};

/// Shared application state
pub struct AppState {
    records: Vec<SalaryRecord>,
}

impl AppState {
    pub fn new(records: Vec<SalaryRecord>) -> Self {
        Self { records }
    }

    /// Loads records from a JSON file. A missing file yields an empty data set.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!("No data file at {path:?}. Run the seeder first: cargo run -p seed");
            return Ok(Self::new(vec![]));
        }

        info!("Loading salary records from {path:?}");
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {path:?}"))?;
        let records: Vec<SalaryRecord> =
            serde_json::from_str(&content).with_context(|| format!("Failed to parse {path:?}"))?;
        info!("Loaded {} salary records", records.len());

        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[SalaryRecord] {
        &self.records
    }
}

/// Handler for GET /salaries
async fn salaries_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SalaryQuery>, QueryRejection>,
) -> Result<Json<Vec<SalaryRecord>>, ApiError> {
    // Reject malformed numbers with 400
    let Query(query) = query?;

    let results: Vec<SalaryRecord> = query.filter(state.records()).cloned().collect();
    info!(?query, matched = results.len(), "GET /salaries");

    Ok(Json(results))
}

/// Handler for GET /salaries/pay_range_summary
async fn pay_range_summary_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SalaryQuery>, QueryRejection>,
) -> Result<Json<Vec<PayRangeCount>>, ApiError> {
    let Query(query) = query?;

    // Aggregate only the records that pass the filters
    let summary = pay_range_summary(query.filter(state.records()), SUMMARY_LIMIT);
    info!(?query, buckets = summary.len(), "GET /salaries/pay_range_summary");

    Ok(Json(summary))
}

/// Handler for GET / (root)
async fn root_handler() -> &'static str {
    "💰 Salary Survey API\n\nEndpoints:\n  GET /salaries - Survey answers matching the filters\n  GET /salaries/pay_range_summary - Top 3 pay ranges for the filters\n\nFilters:\n  title, min_company_size, max_company_size, min_experience, max_experience, area, work_area, currency\n\nExample:\n  curl 'http://127.0.0.1:8000/salaries?title=senior&currency=TRY'"
}

/// Builds the API router with CORS open to any origin.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/salaries", get(salaries_handler))
        .route("/salaries/pay_range_summary", get(pay_range_summary_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    // Load records and create shared state
    let state = Arc::new(AppState::load(&config.data_path)?);
    let app = router(state);

    // Start server
    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("🌐 Server running at http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

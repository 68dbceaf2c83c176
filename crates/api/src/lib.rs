//! Phishing Detection API Server
//!
//! REST API that classifies submitted URLs with the trained phishing model.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use inference_engine::InferenceEngine;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
mod error;
pub mod rate_limit;
mod routes;

pub use config::{LoggingConfig, ServiceConfig};
pub use error::ApiError;

use storage::Repository;

/// Whether the classifier came up at startup
pub enum ModelState {
    Ready(InferenceEngine),
    /// Loading failed; every prediction answers 503 with this reason
    Unavailable(String),
}

/// Application context built once at startup and shared by every handler
pub struct AppState {
    pub model: ModelState,
    /// Served prediction history
    pub repository: Repository,
    /// Prometheus render handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create application state around an already-resolved model
    pub fn new(model: ModelState, repository: Repository) -> Self {
        Self {
            model,
            repository,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Load model artifacts; a failure is kept as `ModelState::Unavailable`
    pub fn from_config(config: &ServiceConfig) -> Self {
        let model = match InferenceEngine::load(&config.model) {
            Ok(engine) => {
                info!(
                    "Model ready: {} backend, {} inputs, scaler={}",
                    engine.classifier_name(),
                    engine.input_dimension(),
                    engine.has_scaler()
                );
                ModelState::Ready(engine)
            }
            Err(e) => {
                error!("Failed to load model, predictions unavailable: {}", e);
                ModelState::Unavailable(e.to_string())
            }
        };
        Self::new(model, Repository::with_capacity(config.server.history_size))
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// The loaded engine, or the startup failure as a 503
    pub fn engine(&self) -> Result<&InferenceEngine, ApiError> {
        match &self.model {
            ModelState::Ready(engine) => Ok(engine),
            ModelState::Unavailable(reason) => Err(ApiError::ModelUnavailable(reason.clone())),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelHealth,
    pub prediction_count: usize,
}

/// Classifier status
#[derive(Debug, Serialize)]
pub struct ModelHealth {
    pub status: String,
    pub backend: Option<String>,
    pub input_dimension: Option<usize>,
    pub detail: Option<String>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/predict", post(routes::predict::predict_url))
        .route("/api/v1/predict", post(routes::predict::predict_url))
        .route("/api/v1/predict/features", post(routes::predict::predict_features))
        .route("/api/v1/features", post(routes::features::extract))
        .route("/api/v1/predictions", get(routes::predictions::get_predictions))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let (status, model) = match &state.model {
        ModelState::Ready(engine) => (
            "healthy",
            ModelHealth {
                status: "ok".to_string(),
                backend: Some(engine.classifier_name().to_string()),
                input_dimension: Some(engine.input_dimension()),
                detail: None,
            },
        ),
        ModelState::Unavailable(reason) => (
            "degraded",
            ModelHealth {
                status: "unavailable".to_string(),
                backend: None,
                input_dimension: None,
                detail: Some(reason.clone()),
            },
        ),
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model,
        prediction_count: state.repository.prediction_count(),
    })
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(ApiError::MetricsDisabled)
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

/// Run the server
pub async fn run_server(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = AppState::from_config(&config);
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Metrics exporter disabled: {}", e),
    }

    let governor = rate_limit::create_governor_config(&config.rate_limit)
        .ok_or("rate_limit.per_second and rate_limit.burst_size must be non-zero")?;
    rate_limit::spawn_limiter_cleanup(&governor, Duration::from_secs(60));

    let mut app = create_router(Arc::new(state)).layer(GovernorLayer { config: governor });
    if config.server.cors {
        app = app.layer(CorsLayer::permissive());
    }

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

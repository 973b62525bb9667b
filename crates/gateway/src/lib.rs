//! HTTP API gateway for Rescueline.
//!
//! Exposes the REST surface the voice frontend and dashboard consume:
//! report intake, report listing, information queries, document ingestion,
//! and health/status checks.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{Router, routing::get};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use rescueline_core::store::{DocumentStore, ReportStore};
use rescueline_pipeline::AnswerPipeline;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: Arc<AnswerPipeline>,
    pub documents: Arc<dyn DocumentStore>,
    pub reports: Arc<dyn ReportStore>,
    pub start_time: chrono::DateTime<Utc>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the full gateway router.
///
/// Layers applied:
/// - Permissive CORS (the dashboard and voice webhooks call cross-origin)
/// - Request body size limit (10 MiB — documents arrive as JSON text)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api", api::api_router(state))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Build the shared state from configuration.
///
/// Builds the store, generator, and pipeline ONCE and shares them via Arc —
/// no module-level singletons anywhere.
pub async fn build_state(
    config: &rescueline_config::AppConfig,
) -> Result<SharedState, Box<dyn std::error::Error>> {
    let (documents, reports): (Arc<dyn DocumentStore>, Arc<dyn ReportStore>) =
        match config.store.backend.as_str() {
            "in_memory" => {
                let store = Arc::new(rescueline_store::InMemoryStore::new());
                (store.clone(), store)
            }
            _ => {
                let path = config.database_path();
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let store = Arc::new(
                    rescueline_store::SqliteStore::new(&format!("sqlite://{}", path.display()))
                        .await?,
                );
                (store.clone(), store)
            }
        };

    let generator = rescueline_providers::build_from_config(config);

    let pipeline = Arc::new(
        AnswerPipeline::new(documents.clone(), generator, &config.default_model)
            .with_temperature(config.default_temperature)
            .with_max_output_tokens(config.default_max_output_tokens)
            .with_max_documents(config.context.max_documents),
    );

    Ok(Arc::new(GatewayState {
        pipeline,
        documents,
        reports,
        start_time: Utc::now(),
    }))
}

/// Start the gateway HTTP server.
pub async fn start(
    config: rescueline_config::AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = build_state(&config).await?;
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

async fn root_handler() -> &'static str {
    "Rescueline disaster-response backend running"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

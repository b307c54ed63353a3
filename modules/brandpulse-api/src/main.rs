use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use brandpulse_common::Config;
use brandpulse_core::{
    AnalysisBackend, CoreDeps, HttpAnalysisBackend, Orchestrator, PollBudget, Poller,
};
use brandpulse_store::{migrate, PgLedger, PgResultCache};

mod rest;
mod sweep;

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub poller: Poller,
    pub poll_budget: PollBudget,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("brandpulse=info".parse()?))
        .init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url).await?;
    migrate(&pool).await?;

    let backend: Option<Arc<dyn AnalysisBackend>> = match config.endpoint_url.as_deref() {
        Some(url) => {
            info!(endpoint = url, "Analysis backend configured");
            Some(Arc::new(HttpAnalysisBackend::new(
                url,
                config.api_token.as_deref(),
            )))
        }
        None => {
            warn!("ENDPOINT_URL not set; new analysis attempts will be refused");
            None
        }
    };

    let deps = CoreDeps::new(
        Arc::new(PgResultCache::new(pool.clone())),
        Arc::new(PgLedger::new(pool.clone())),
        backend,
        config.cache_ttl_secs,
    );

    sweep::start_sweep(
        deps.clone(),
        config.sweep_interval_secs,
        config.failed_retention_secs,
    );

    let state = Arc::new(AppState {
        orchestrator: Orchestrator::new(deps.clone()),
        poller: Poller::new(deps),
        poll_budget: PollBudget::new(
            std::time::Duration::from_secs(config.poll_max_secs),
            std::time::Duration::from_secs(config.poll_interval_secs),
        ),
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // REST API
        .route("/api/analyze", post(rest::api_analyze))
        .route("/api/analyze/wait", post(rest::api_analyze_wait))
        .route("/api/status/{user_id}/{session_id}", get(rest::api_status))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("BrandPulse API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

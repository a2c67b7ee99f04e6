use anyhow::Result;
use axum::{
    routing::{get, post},
    Json, Router,
};
use signal_optimizer::OptimizerConfig;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<OptimizerConfig>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "signal_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var("SIGNAL_OPTIMIZER_CONFIG") {
        Ok(path) => {
            tracing::info!("   Optimizer config: {}", path);
            OptimizerConfig::load(&path)?
        }
        Err(_) => OptimizerConfig::default(),
    };

    let state = AppState {
        config: Arc::new(config),
    };

    let port = std::env::var("SIGNAL_GATEWAY_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "18700".to_string());
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("🚦 Signal Gateway starting on {}", addr);
    tracing::info!(
        "   Cycle: {}s, green {}-{}s, yellow {}s",
        state.config.cycle.total_cycle_time,
        state.config.cycle.min_green,
        state.config.cycle.max_green,
        state.config.cycle.yellow_time
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/optimize", post(routes::optimize))
        .route("/intersections/:id/optimize", post(routes::optimize_intersection))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "signal-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

use analysis_orchestrator::RequestPipeline;
use anyhow::Context;
use axum::{routing::get, Router};
use market_data::MarketDataClient;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod info_routes;

pub use error::AppError;

/// Shared application state: the pipeline is built once at startup and every
/// handler borrows it through here.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RequestPipeline>,
}

/// Configure and run the API server until shutdown.
pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api_server=info,analysis_orchestrator=info,market_data=warn".into()
            }),
        )
        .init();

    let api_key =
        std::env::var("MARKET_DATA_API_KEY").context("MARKET_DATA_API_KEY must be set")?;
    let market_data = Arc::new(MarketDataClient::new(api_key));
    let state = AppState {
        pipeline: Arc::new(RequestPipeline::new(market_data)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(|| async { "OK" }))
        .merge(info_routes::info_routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("API server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

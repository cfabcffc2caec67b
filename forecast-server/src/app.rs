use std::sync::Arc;

use axum::{Router, routing::get};
use forecast_core::ForecastGateway;
use tower_http::trace::TraceLayer;

use crate::handler;

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ForecastGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn ForecastGateway>) -> Self {
        Self { gateway }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weatherforecast", get(handler::get_weather_forecast))
        .route("/health", get(handler::health))
        // failures are logged once by `AppError`
        .layer(TraceLayer::new_for_http().on_failure(()))
        .with_state(state)
}

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use forecast_core::{Coordinates, ForecastError, NormalizedForecast};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppState;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error while fetching weather data.";

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "UP", service: "weather-api" })
}

/// GET /weatherforecast?lat=..&lng=..
///
/// Missing coordinates fall back to the default reference point.
pub async fn get_weather_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<NormalizedForecast>, AppError> {
    let coords = Coordinates::or_default(query.lat, query.lng);
    let forecast = state.gateway.fetch_forecast(&coords).await?;
    Ok(Json(forecast))
}

/// Maps a gateway failure onto the HTTP status and `{error, details}` body.
#[derive(Debug)]
pub struct AppError(pub ForecastError);

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0 {
            ForecastError::Api(api) => {
                tracing::warn!(status = api.status, details = ?api.details, "API error: {}", api.message);

                let status = StatusCode::from_u16(api.status).unwrap_or(StatusCode::BAD_GATEWAY);
                let body = ErrorBody { error: api.message, details: api.details };
                (status, Json(body)).into_response()
            }
            other => {
                tracing::error!(error = %other, "Internal error while fetching forecast");

                let body = ErrorBody {
                    error: INTERNAL_ERROR_MESSAGE.to_string(),
                    details: Some(Value::String(other.to_string())),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

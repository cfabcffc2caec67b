use async_trait::async_trait;
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_TYPE},
};

use crate::{
    error::{ApiError, ForecastError, ProviderErrorBody},
    model::{Coordinates, NormalizedForecast, ProviderResponse},
};

use super::ForecastGateway;

pub const DEFAULT_BASE_URL: &str = "https://api.stormglass.io";

/// Readings requested from the point endpoint.
const PARAMS: &str = "airTemperature,cloudCover";

#[derive(Debug, Clone)]
pub struct StormGlassGateway {
    api_key: String,
    base_url: String,
    http: Client,
}

impl StormGlassGateway {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn point_url(&self) -> String {
        format!("{}/v2/weather/point", self.base_url)
    }
}

#[async_trait]
impl ForecastGateway for StormGlassGateway {
    async fn fetch_forecast(&self, coords: &Coordinates) -> Result<NormalizedForecast, ForecastError> {
        if self.api_key.trim().is_empty() {
            return Err(ForecastError::MissingApiKey);
        }

        tracing::debug!(lat = %coords.lat, lng = %coords.lng, "Requesting StormGlass point forecast");

        let res = self
            .http
            .get(self.point_url())
            .query(&[("lat", coords.lat.as_str()), ("lng", coords.lng.as_str()), ("params", PARAMS)])
            .header(AUTHORIZATION, self.api_key.as_str())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ApiError::new(
                status.as_u16(),
                format!("Weather provider request failed ({})", status.as_u16()),
                Some(ProviderErrorBody::details_from_body(&body)),
            )
            .into());
        }

        let parsed: ProviderResponse = serde_json::from_str(&body)?;

        if let Some(meta) = &parsed.meta {
            tracing::debug!(
                cost = ?meta.cost,
                daily_quota = ?meta.daily_quota,
                request_count = ?meta.request_count,
                "StormGlass quota"
            );
        }

        let first = parsed.hours.first().ok_or_else(ApiError::no_data)?;

        Ok(NormalizedForecast::from_point(coords, first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hour(time: &str, temp: serde_json::Value, cloud: serde_json::Value) -> serde_json::Value {
        json!({
            "time": time,
            "airTemperature": { "sg": temp },
            "cloudCover": { "sg": cloud }
        })
    }

    fn gateway_for(server: &MockServer) -> StormGlassGateway {
        StormGlassGateway::with_base_url("test_key".into(), &server.uri())
    }

    #[tokio::test]
    async fn formats_first_hour() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/weather/point"))
            .and(query_param("lat", "-23.55"))
            .and(query_param("lng", "-46.63"))
            .and(query_param("params", "airTemperature,cloudCover"))
            .and(header("Authorization", "test_key"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hours": [
                    hour("2024-05-01T00:00:00+00:00", json!(23.456), json!(12.4)),
                    hour("2024-05-01T01:00:00+00:00", json!(30.0), json!(90.0)),
                ],
                "meta": { "cost": 1, "dailyQuota": 10, "requestCount": 1 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let forecast = gateway_for(&server).fetch_forecast(&Coordinates::default()).await.unwrap();

        assert_eq!(
            forecast,
            NormalizedForecast {
                latitude: "-23.55".into(),
                longitude: "-46.63".into(),
                timestamp: "2024-05-01T00:00:00+00:00".into(),
                temperature_celsius: "23.5".into(),
                cloud_cover_percent: "12".into(),
                source: "StormGlass.io".into(),
            }
        );
    }

    #[tokio::test]
    async fn echoes_coordinates_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/weather/point"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hours": [hour("t", json!(null), json!(null))]
            })))
            .mount(&server)
            .await;

        let coords = Coordinates::new("58.7984", "17.8081");
        let forecast = gateway_for(&server).fetch_forecast(&coords).await.unwrap();

        assert_eq!(forecast.latitude, "58.7984");
        assert_eq!(forecast.longitude, "17.8081");
        assert_eq!(forecast.temperature_celsius, "N/A");
        assert_eq!(forecast.cloud_cover_percent, "N/A");
    }

    #[tokio::test]
    async fn empty_hours_is_a_no_data_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/weather/point"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hours": [], "meta": {} })))
            .mount(&server)
            .await;

        let err = gateway_for(&server).fetch_forecast(&Coordinates::default()).await.unwrap_err();

        match err {
            ForecastError::Api(api) => {
                assert_eq!(api, ApiError::no_data());
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_error_status_and_details_are_mirrored() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/weather/point"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "errors": { "lat": ["invalid"] } })),
            )
            .mount(&server)
            .await;

        let err = gateway_for(&server).fetch_forecast(&Coordinates::new("x", "y")).await.unwrap_err();

        match err {
            ForecastError::Api(api) => {
                assert_eq!(api.status, 401);
                assert_eq!(api.details, Some(json!({ "lat": ["invalid"] })));
                assert!(api.message.contains("401"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_404_keeps_provider_details() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/weather/point"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let err = gateway_for(&server).fetch_forecast(&Coordinates::default()).await.unwrap_err();

        match err {
            ForecastError::Api(api) => {
                assert_eq!(api.status, 404);
                assert_ne!(api, ApiError::no_data());
                assert_eq!(api.details, Some(json!("not here")));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/weather/point"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
            .mount(&server)
            .await;

        let err = gateway_for(&server).fetch_forecast(&Coordinates::default()).await.unwrap_err();
        assert!(matches!(err, ForecastError::Decode(_)));
    }

    #[tokio::test]
    async fn blank_key_fails_before_any_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let gateway = StormGlassGateway::with_base_url("  ".into(), &server.uri());
        let err = gateway.fetch_forecast(&Coordinates::default()).await.unwrap_err();

        assert!(matches!(err, ForecastError::MissingApiKey));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        // listener is dropped, so the port refuses connections
        let gateway = StormGlassGateway::with_base_url("key".into(), &format!("http://{addr}"));
        let err = gateway.fetch_forecast(&Coordinates::default()).await.unwrap_err();

        assert!(matches!(err, ForecastError::Transport(_)));
    }
}

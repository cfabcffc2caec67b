use serde::{Deserialize, Serialize};

/// São Paulo, used whenever the caller omits a coordinate.
pub const DEFAULT_LAT: &str = "-23.55";
pub const DEFAULT_LNG: &str = "-46.63";

/// Label reported in every normalized forecast.
pub const SOURCE_LABEL: &str = "StormGlass.io";

/// Rendered in place of a reading the provider did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// Coordinates as received from the caller. Forwarded to the provider verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub lng: String,
}

impl Coordinates {
    pub fn new(lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self { lat: lat.into(), lng: lng.into() }
    }

    /// Fill each missing (or empty) coordinate from the default reference point.
    pub fn or_default(lat: Option<String>, lng: Option<String>) -> Self {
        let pick = |value: Option<String>, fallback: &str| {
            value.filter(|v| !v.is_empty()).unwrap_or_else(|| fallback.to_string())
        };

        Self { lat: pick(lat, DEFAULT_LAT), lng: pick(lng, DEFAULT_LNG) }
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        Self::new(DEFAULT_LAT, DEFAULT_LNG)
    }
}

/// A single reading; `sg` is the StormGlass-sourced value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataPoint {
    #[serde(default)]
    pub sg: Option<f64>,
}

/// One hourly record of the provider response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderForecastPoint {
    pub time: String,
    #[serde(default)]
    pub air_temperature: Option<DataPoint>,
    #[serde(default)]
    pub cloud_cover: Option<DataPoint>,
}

impl ProviderForecastPoint {
    pub fn air_temperature_sg(&self) -> Option<f64> {
        self.air_temperature.as_ref().and_then(|p| p.sg)
    }

    pub fn cloud_cover_sg(&self) -> Option<f64> {
        self.cloud_cover.as_ref().and_then(|p| p.sg)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMeta {
    pub cost: Option<f64>,
    pub daily_quota: Option<u64>,
    pub request_count: Option<u64>,
}

/// Successful body of `GET /v2/weather/point`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub hours: Vec<ProviderForecastPoint>,
    #[serde(default)]
    pub meta: Option<ProviderMeta>,
}

/// Forecast shape returned to our own callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedForecast {
    pub latitude: String,
    pub longitude: String,
    pub timestamp: String,
    pub temperature_celsius: String,
    pub cloud_cover_percent: String,
    pub source: String,
}

impl NormalizedForecast {
    /// Build from the first hour of a provider response.
    pub fn from_point(coords: &Coordinates, point: &ProviderForecastPoint) -> Self {
        Self {
            latitude: coords.lat.clone(),
            longitude: coords.lng.clone(),
            timestamp: point.time.clone(),
            temperature_celsius: format_reading(point.air_temperature_sg(), 1),
            cloud_cover_percent: format_reading(point.cloud_cover_sg(), 0),
            source: SOURCE_LABEL.to_string(),
        }
    }
}

fn format_reading(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => to_fixed(v, decimals),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Fixed-point rendering where exact halves round away from zero.
///
/// `format!` resolves exact ties to the even digit, so those are bumped
/// explicitly. Values that only look like ties in decimal (23.45 is stored as
/// 23.4499...) are not exact and keep the formatter's result.
fn to_fixed(v: f64, decimals: usize) -> String {
    let p = 10f64.powi(decimals as i32);
    let scaled = v * p;
    let exact_tie = scaled.fract().abs() == 0.5 && v.mul_add(p, -scaled) == 0.0;

    if exact_tie {
        let rounded = (scaled + 0.5f64.copysign(v)) / p;
        format!("{rounded:.decimals$}")
    } else {
        format!("{v:.decimals$}")
    }
}

use crate::{Config, Coordinates, ForecastError, NormalizedForecast, provider::stormglass::StormGlassGateway};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod stormglass;

/// Source of normalized forecasts for a pair of coordinates.
#[async_trait]
pub trait ForecastGateway: Send + Sync + Debug {
    async fn fetch_forecast(&self, coords: &Coordinates) -> Result<NormalizedForecast, ForecastError>;
}

/// Construct the StormGlass gateway from config.
///
/// Fails when no API key is configured, so the server never starts without one.
pub fn gateway_from_config(config: &Config) -> anyhow::Result<Arc<dyn ForecastGateway>> {
    let api_key = config.api_key()?.to_owned();

    let gateway = match config.base_url() {
        Some(base_url) => StormGlassGateway::with_base_url(api_key, base_url),
        None => StormGlassGateway::new(api_key),
    };

    Ok(Arc::new(gateway))
}

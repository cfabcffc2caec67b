//! Core library for the marine forecast proxy.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The forecast gateway abstraction and its StormGlass implementation
//! - Shared domain models (coordinates, provider payloads, normalized forecast)
//! - The error taxonomy surfaced to HTTP callers
//!
//! It is used by `forecast-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use config::{Config, ProviderConfig};
pub use error::{ApiError, ForecastError};
pub use model::{Coordinates, NormalizedForecast};
pub use provider::{ForecastGateway, gateway_from_config};

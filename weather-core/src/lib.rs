//! Core library for the weather aggregation service.
//!
//! This crate defines:
//! - Configuration & API key resolution
//! - The OpenWeatherMap upstream client and payload decoding
//! - Concurrent current+forecast fetching and merging
//! - Shared domain models (coordinates, merged reports)
//!
//! It is used by `weather-server`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod provider;

pub use aggregate::WeatherAggregator;
pub use config::Config;
pub use error::FetchError;
pub use model::{Coordinates, ForecastEntry, WeatherReport};
pub use provider::WeatherSource;
pub use provider::openweather::OpenWeatherClient;

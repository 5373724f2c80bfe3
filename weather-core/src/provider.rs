use crate::{
    error::FetchError,
    model::Coordinates,
    provider::openweather::{CurrentWeather, Forecast},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Abstraction over the upstream weather data source.
///
/// The production implementation is [`openweather::OpenWeatherClient`]; the
/// aggregator only ever talks through this trait, which keeps its
/// join-and-merge policy testable without a network.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Fetch the current-conditions payload for the given coordinates.
    async fn current(&self, coords: Coordinates) -> Result<CurrentWeather, FetchError>;

    /// Fetch the forecast payload for the given coordinates.
    async fn forecast(&self, coords: Coordinates) -> Result<Forecast, FetchError>;
}

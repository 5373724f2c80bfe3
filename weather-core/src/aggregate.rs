//! Concurrent fan-out to the two upstream endpoints and the fan-in policy.

use std::sync::Arc;

use crate::{
    config::Config,
    error::FetchError,
    merge,
    model::{Coordinates, WeatherReport},
    provider::{
        WeatherSource,
        openweather::{CurrentWeather, Forecast, OpenWeatherClient},
    },
};

/// Tags which upstream task a result came from, so the join point can sort
/// the two completions back into their slots.
enum FetchOutcome {
    Current(CurrentWeather),
    Forecast(Forecast),
}

/// Fetches current conditions and the forecast concurrently and merges them.
///
/// Per call: two independent tokio tasks are spawned, both are always awaited
/// (a barrier, not a race — there is no cancellation path and no per-fetch
/// timeout here), and only then is the failure policy applied:
///
/// 1. Any [`FetchError`] from either task aborts the whole aggregation.
/// 2. Otherwise an upstream-reported error code in either payload (current
///    checked first) yields an `error: true` report and discards the other
///    payload's data.
/// 3. Otherwise both payloads are merged into a success report.
#[derive(Debug, Clone)]
pub struct WeatherAggregator {
    source: Arc<dyn WeatherSource>,
}

impl WeatherAggregator {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    /// Aggregator backed by the real OpenWeatherMap client.
    pub fn openweather(config: &Config) -> Self {
        Self::new(Arc::new(OpenWeatherClient::new(config)))
    }

    pub async fn fetch(&self, coords: Coordinates) -> Result<WeatherReport, FetchError> {
        let source = Arc::clone(&self.source);
        let current_task =
            tokio::spawn(async move { source.current(coords).await.map(FetchOutcome::Current) });

        let source = Arc::clone(&self.source);
        let forecast_task =
            tokio::spawn(async move { source.forecast(coords).await.map(FetchOutcome::Forecast) });

        // Both tasks terminate before any outcome is examined.
        let (current_res, forecast_res) = tokio::join!(current_task, forecast_task);

        let mut current = None;
        let mut forecast = None;
        for outcome in [current_res??, forecast_res??] {
            match outcome {
                FetchOutcome::Current(payload) => current = Some(payload),
                FetchOutcome::Forecast(payload) => forecast = Some(payload),
            }
        }
        let (Some(current), Some(forecast)) = (current, forecast) else {
            return Err(FetchError::Incomplete);
        };

        if let Some(reason) = current.error() {
            return Ok(WeatherReport::upstream_error(reason));
        }
        if let Some(reason) = forecast.error() {
            return Ok(WeatherReport::upstream_error(reason));
        }

        merge::merge(&current, &forecast)
    }
}

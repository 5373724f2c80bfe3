//! Builds the merged [`WeatherReport`] out of the two decoded payloads.
//!
//! Only called once both payloads carry a success `cod`; upstream-reported
//! errors never reach this module.

use chrono::Utc;

use crate::{
    error::FetchError,
    model::{ForecastEntry, WeatherReport},
    provider::openweather::{Condition, CurrentWeather, Forecast, ForecastItem, MainBlock, Wind},
};

/// Merge a current-conditions payload and a forecast payload.
///
/// The current snapshot becomes the first entry, stamped "now"; the forecast
/// items follow in upstream order. The city name comes from the
/// current-conditions payload. Any entry missing a mandatory sub-block aborts
/// the whole merge with [`FetchError::MissingBlock`].
pub fn merge(current: &CurrentWeather, forecast: &Forecast) -> Result<WeatherReport, FetchError> {
    let items = forecast.list.as_deref().unwrap_or(&[]);

    let mut entries = Vec::with_capacity(1 + items.len());
    entries.push(normalize_current(current)?);
    for item in items {
        entries.push(normalize_item(item)?);
    }

    Ok(WeatherReport::success(current.name.clone(), entries))
}

fn normalize_current(current: &CurrentWeather) -> Result<ForecastEntry, FetchError> {
    normalize(
        Utc::now().timestamp(),
        current.weather.as_deref(),
        current.main.as_ref(),
        current.wind.as_ref(),
    )
}

fn normalize_item(item: &ForecastItem) -> Result<ForecastEntry, FetchError> {
    normalize(item.dt, item.weather.as_deref(), item.main.as_ref(), item.wind.as_ref())
}

fn normalize(
    timestamp: i64,
    weather: Option<&[Condition]>,
    main: Option<&MainBlock>,
    wind: Option<&Wind>,
) -> Result<ForecastEntry, FetchError> {
    let condition = weather
        .and_then(|conditions| conditions.first())
        .ok_or(FetchError::MissingBlock("weather"))?;
    let main = main.ok_or(FetchError::MissingBlock("main"))?;
    let wind = wind.ok_or(FetchError::MissingBlock("wind"))?;

    Ok(ForecastEntry {
        timestamp,
        description: condition.description.clone(),
        icon: condition.icon.clone(),
        temperature: main.temp,
        wind_speed: wind.speed,
        wind_direction: wind.deg,
    })
}

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// A latitude/longitude pair, validated to be finite.
///
/// No range validation is applied; OpenWeatherMap clamps out-of-range values
/// itself and answers with an in-payload error code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, FetchError> {
        if lat.is_finite() && lon.is_finite() {
            Ok(Self { lat, lon })
        } else {
            Err(FetchError::InvalidCoordinates)
        }
    }
}

/// One normalized weather snapshot, whichever endpoint it came from.
///
/// Field spelling on the wire is camelCase to keep the public JSON contract
/// stable (`windSpeed`, `windDirection`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    /// Unix timestamp of the snapshot; "now" for the current-conditions entry.
    pub timestamp: i64,
    /// Short weather description, e.g. "light rain".
    pub description: String,
    /// OpenWeatherMap icon id.
    pub icon: String,
    /// Temperature in kelvin.
    pub temperature: f64,
    pub wind_speed: f64,
    pub wind_direction: i64,
}

/// The merged response body served to clients.
///
/// Built only through [`WeatherReport::success`] and
/// [`WeatherReport::upstream_error`], so a report never carries a forecast
/// list and an error flag at the same time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Current conditions first, then the upstream forecast in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Vec<ForecastEntry>>,

    /// True when the provider itself reported an error code.
    #[serde(default)]
    pub error: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WeatherReport {
    pub fn success(city: Option<String>, forecast: Vec<ForecastEntry>) -> Self {
        Self { city, forecast: Some(forecast), error: false, reason: None }
    }

    /// Wrap a provider-reported error (non-200 `cod`) as a serving-level
    /// success with the error flag set.
    pub fn upstream_error(reason: String) -> Self {
        Self { city: None, forecast: None, error: true, reason: Some(reason) }
    }
}

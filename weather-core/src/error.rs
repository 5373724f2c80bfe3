use thiserror::Error;

/// Failures that abort a whole aggregation.
///
/// An upstream-reported error (non-200 `cod` inside a well-formed payload) is
/// deliberately NOT represented here: it is carried inside a successful
/// [`crate::WeatherReport`] with `error: true` instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The OpenWeatherMap API key was not configured. Checked before any
    /// network call, on both fetch paths.
    #[error("OpenWeatherMap API key is not set (set the {} environment variable)", crate::config::API_KEY_ENV)]
    ApiKeyMissing,

    /// Transport-level failure reaching the provider (DNS, timeout, reset).
    #[error("network error talking to OpenWeatherMap: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider body was not the JSON we expect.
    #[error("failed to decode OpenWeatherMap payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload decoded but lacks a sub-block that normalization requires.
    #[error("weather payload is missing its '{0}' block")]
    MissingBlock(&'static str),

    /// Latitude or longitude was not a finite number.
    #[error("coordinates must be finite numbers")]
    InvalidCoordinates,

    /// A spawned fetch task was aborted or panicked.
    #[error("background fetch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The fan-out terminated without yielding both payloads.
    #[error("upstream fan-out completed without both payloads")]
    Incomplete,
}

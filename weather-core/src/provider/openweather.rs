use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use crate::{config::Config, error::FetchError, model::Coordinates};

use super::WeatherSource;

/// The `cod` value OpenWeatherMap uses for a successful payload.
pub const SUCCESS_COD: i64 = 200;

/// HTTP client for the two OpenWeatherMap endpoints (`/weather`, `/forecast`).
///
/// Error detection is done on the in-payload `cod` field, not the HTTP status
/// line: the provider ships its error descriptions inside well-formed JSON
/// bodies.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(api_key: Option<&str>, base_url: &str) -> Self {
        Self {
            api_key: api_key.map(str::to_string),
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Both fetch paths share this precondition: no key, no network call.
    fn api_key(&self) -> Result<&str, FetchError> {
        self.api_key.as_deref().ok_or(FetchError::ApiKeyMissing)
    }

    async fn get_decoded<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        coords: Coordinates,
    ) -> Result<T, FetchError> {
        let key = self.api_key()?;
        let url = format!("{}/{}", self.base_url, endpoint);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
                ("appid", key.to_string()),
            ])
            .send()
            .await?;

        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, coords: Coordinates) -> Result<CurrentWeather, FetchError> {
        self.get_decoded("weather", coords).await
    }

    async fn forecast(&self, coords: Coordinates) -> Result<Forecast, FetchError> {
        self.get_decoded("forecast", coords).await
    }
}

/// One weather condition descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Temperature block; values in kelvin.
#[derive(Debug, Clone, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i64,
    pub humidity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: i64,
}

/// Root of the current-conditions payload.
/// <https://openweathermap.org/current>
///
/// Condition/temperature/wind blocks are optional at the decode level; their
/// absence only fails later, when normalization needs them.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub weather: Option<Vec<Condition>>,
    pub main: Option<MainBlock>,
    pub wind: Option<Wind>,
    /// City name.
    pub name: Option<String>,
    pub cod: i64,
    pub message: Option<String>,
}

impl CurrentWeather {
    /// Provider-reported error, if any.
    pub fn error(&self) -> Option<String> {
        status_error(self.cod, self.message.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
}

/// One forecast snapshot; structurally a current-conditions reading plus its
/// own timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub weather: Option<Vec<Condition>>,
    pub main: Option<MainBlock>,
    pub wind: Option<Wind>,
}

/// Root of the forecast payload.
/// <https://openweathermap.org/forecast5>
#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    /// The API renders `cod` as a string on this endpoint's success variant,
    /// so a failed numeric decode falls back to 200 instead of rejecting the
    /// whole payload.
    #[serde(default = "success_cod", deserialize_with = "lenient_cod")]
    pub cod: i64,
    /// On success the API renders `message` as a number; only keep strings.
    #[serde(default, deserialize_with = "lenient_message")]
    pub message: Option<String>,
    pub city: Option<City>,
    pub list: Option<Vec<ForecastItem>>,
}

impl Forecast {
    /// Provider-reported error, if any.
    pub fn error(&self) -> Option<String> {
        status_error(self.cod, self.message.as_deref())
    }
}

fn status_error(cod: i64, message: Option<&str>) -> Option<String> {
    if cod == SUCCESS_COD {
        return None;
    }
    Some(message.map_or_else(|| format!("Error code: {cod}"), str::to_string))
}

fn success_cod() -> i64 {
    SUCCESS_COD
}

fn lenient_cod<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_i64().unwrap_or(SUCCESS_COD))
}

fn lenient_message<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coords() -> Coordinates {
        Coordinates::new(45.06, 7.66).expect("finite")
    }

    #[test]
    fn decodes_full_current_payload() {
        let body = serde_json::json!({
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "main": {"temp": 284.1, "feels_like": 283.2, "temp_min": 282.0,
                     "temp_max": 286.0, "pressure": 1016, "humidity": 71},
            "wind": {"speed": 4.6, "deg": 250},
            "name": "Turin",
            "cod": 200
        });

        let current: CurrentWeather =
            serde_json::from_value(body).expect("well-formed payload decodes");

        assert_eq!(current.cod, 200);
        assert!(current.error().is_none());
        assert_eq!(current.name.as_deref(), Some("Turin"));
        assert_eq!(current.weather.unwrap()[0].icon, "10d");
        assert_eq!(current.wind.unwrap().deg, 250);
    }

    #[test]
    fn current_payload_tolerates_absent_blocks() {
        let current: CurrentWeather =
            serde_json::from_value(serde_json::json!({"cod": 200})).expect("blocks are optional");

        assert!(current.weather.is_none());
        assert!(current.main.is_none());
        assert!(current.wind.is_none());
        assert!(current.error().is_none());
    }

    #[test]
    fn current_error_prefers_provider_message() {
        let current: CurrentWeather =
            serde_json::from_value(serde_json::json!({"cod": 500, "message": "server error"}))
                .expect("error payload decodes");

        assert_eq!(current.error().as_deref(), Some("server error"));
    }

    #[test]
    fn current_error_without_message_is_generated() {
        let current: CurrentWeather =
            serde_json::from_value(serde_json::json!({"cod": 404})).expect("error payload decodes");

        assert_eq!(current.error().as_deref(), Some("Error code: 404"));
    }

    #[test]
    fn forecast_cod_tolerates_string_encoding() {
        let forecast: Forecast = serde_json::from_value(serde_json::json!({
            "cod": "200",
            "message": 0,
            "list": []
        }))
        .expect("string cod decodes");

        assert_eq!(forecast.cod, SUCCESS_COD);
        assert!(forecast.message.is_none());
        assert!(forecast.error().is_none());
    }

    #[test]
    fn forecast_cod_defaults_when_absent() {
        let forecast: Forecast =
            serde_json::from_value(serde_json::json!({})).expect("empty object decodes");

        assert_eq!(forecast.cod, SUCCESS_COD);
        assert!(forecast.list.is_none());
    }

    #[test]
    fn forecast_numeric_cod_is_kept() {
        let forecast: Forecast =
            serde_json::from_value(serde_json::json!({"cod": 429, "message": "quota exceeded"}))
                .expect("error payload decodes");

        assert_eq!(forecast.cod, 429);
        assert_eq!(forecast.error().as_deref(), Some("quota exceeded"));
    }

    #[tokio::test]
    async fn fetch_current_hits_weather_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "45.06"))
            .and(query_param("lon", "7.66"))
            .and(query_param("appid", "TEST_KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Turin",
                "cod": 200
            })))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url(Some("TEST_KEY"), &server.uri());
        let current = client.current(coords()).await.expect("fetch succeeds");

        assert_eq!(current.name.as_deref(), Some("Turin"));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url(None, &server.uri());

        let err = client.current(coords()).await.unwrap_err();
        assert!(matches!(err, FetchError::ApiKeyMissing));

        let err = client.forecast(coords()).await.unwrap_err();
        assert!(matches!(err, FetchError::ApiKeyMissing));
    }

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        // Port 9 (discard) is not listening in the test environment.
        let client = OpenWeatherClient::with_base_url(Some("TEST_KEY"), "http://127.0.0.1:9");

        let err = client.forecast(coords()).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decoding_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = OpenWeatherClient::with_base_url(Some("TEST_KEY"), &server.uri());

        let err = client.forecast(coords()).await.unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
    }
}

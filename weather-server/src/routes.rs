use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use weather_core::{Coordinates, FetchError, WeatherAggregator, WeatherReport};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: WeatherAggregator,
}

pub fn router(aggregator: WeatherAggregator) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/weather", get(get_weather))
        .layer(cors)
        .with_state(AppState { aggregator })
}

/// GET / - Index page
async fn index() -> &'static str {
    "Welcome to the Weather API! 🌤"
}

/// Both parameters stay optional at the extractor level so each missing one
/// gets its own descriptive 400.
#[derive(Debug, Deserialize)]
struct WeatherParams {
    lat: Option<f64>,
    lon: Option<f64>,
}

impl WeatherParams {
    fn coordinates(&self) -> Result<Coordinates, ApiError> {
        let lat = self.lat.ok_or(ApiError::MissingParam("lat"))?;
        let lon = self.lon.ok_or(ApiError::MissingParam("lon"))?;
        Coordinates::new(lat, lon).map_err(|_| ApiError::NonFiniteParams)
    }
}

/// GET /weather?lat=..&lon=.. - Merged current weather and forecast
async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<WeatherReport>, ApiError> {
    let coords = params.coordinates()?;
    let report = state.aggregator.fetch(coords).await.map_err(ApiError::Internal)?;
    Ok(Json(report))
}

#[derive(Debug)]
enum ApiError {
    MissingParam(&'static str),
    NonFiniteParams,
    Internal(FetchError),
}

/// Error body shape shared with upstream-reported errors:
/// `{"error": true, "reason": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: bool,
    reason: String,
}

impl ErrorBody {
    fn new(reason: impl Into<String>) -> Self {
        Self { error: true, reason: reason.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingParam(name) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new(format!("Missing '{name}' parameter")),
            ),
            ApiError::NonFiniteParams => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Parameters 'lat' and 'lon' must be finite numbers"),
            ),
            ApiError::Internal(err) => {
                tracing::error!("weather aggregation failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new("Internal Server Error"))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn index_shows_greeting() {
        assert_eq!(index().await, "Welcome to the Weather API! 🌤");
    }

    #[test]
    fn missing_lat_is_reported_before_lon() {
        let params = WeatherParams { lat: None, lon: None };
        assert!(matches!(params.coordinates(), Err(ApiError::MissingParam("lat"))));

        let params = WeatherParams { lat: Some(45.06), lon: None };
        assert!(matches!(params.coordinates(), Err(ApiError::MissingParam("lon"))));
    }

    #[test]
    fn non_finite_params_are_rejected() {
        let params = WeatherParams { lat: Some(f64::NAN), lon: Some(7.66) };
        assert!(matches!(params.coordinates(), Err(ApiError::NonFiniteParams)));
    }

    #[test]
    fn valid_params_become_coordinates() {
        let params = WeatherParams { lat: Some(45.06), lon: Some(7.66) };
        let coords = params.coordinates().expect("valid coordinates");
        assert_eq!(coords.lat, 45.06);
        assert_eq!(coords.lon, 7.66);
    }

    #[test]
    fn missing_param_maps_to_bad_request() {
        let response = ApiError::MissingParam("lat").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn core_failure_maps_to_internal_server_error() {
        let response = ApiError::Internal(FetchError::ApiKeyMissing).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_matches_the_wire_shape() {
        let body = serde_json::to_value(ErrorBody::new("Missing 'lat' parameter"))
            .expect("serializable");
        assert_eq!(
            body,
            serde_json::json!({"error": true, "reason": "Missing 'lat' parameter"})
        );
    }
}

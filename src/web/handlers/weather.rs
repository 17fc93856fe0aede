use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tower_cookies::Cookies;

use crate::app::AppState;
use crate::auth::session;
use crate::models::weather::{NewWeather, WeatherChanges};
use crate::models::now_rfc3339;
use crate::provider::{kelvin_to_celsius, Observation};
use crate::web::error::{ApiError, FieldError};
use crate::web::session::SessionUser;

#[derive(Debug)]
struct CreateWeather {
    city: String,
    temperature: f64,
    description: Option<String>,
    humidity: Option<f64>,
    pressure: Option<f64>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
}

fn optional_number(body: &Value, field: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_f64() {
            Some(n) => Some(n),
            None => {
                errors.push(FieldError::new(
                    field,
                    &format!("{} must be a number", field),
                ));
                None
            }
        },
    }
}

fn optional_string(body: &Value, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                errors.push(FieldError::new(
                    field,
                    &format!("{} must be a string", field),
                ));
                None
            }
        },
    }
}

/// Collects every violated rule rather than stopping at the first one.
fn validate_create(body: &Value) -> Result<CreateWeather, Vec<FieldError>> {
    let mut errors = Vec::new();

    let city = match body.get("city").and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => Some(s.to_string()),
        _ => {
            errors.push(FieldError::new("city", "City is required"));
            None
        }
    };

    let temperature = match body.get("temperature").and_then(|v| v.as_f64()) {
        Some(n) => Some(n),
        None => {
            errors.push(FieldError::new(
                "temperature",
                "Temperature must be a number",
            ));
            None
        }
    };

    let description = optional_string(body, "description", &mut errors);
    let humidity = optional_number(body, "humidity", &mut errors);
    let pressure = optional_number(body, "pressure", &mut errors);
    let wind_speed = optional_number(body, "windSpeed", &mut errors);
    let wind_direction = optional_number(body, "windDirection", &mut errors);

    match (city, temperature) {
        (Some(city), Some(temperature)) if errors.is_empty() => Ok(CreateWeather {
            city,
            temperature,
            description,
            humidity,
            pressure,
            wind_speed,
            wind_direction,
        }),
        _ => Err(errors),
    }
}

fn validate_update(body: &Value) -> Result<WeatherChanges, Vec<FieldError>> {
    let mut errors = Vec::new();

    let changes = WeatherChanges {
        temperature: optional_number(body, "temperature", &mut errors),
        description: optional_string(body, "description", &mut errors),
        humidity: optional_number(body, "humidity", &mut errors),
        pressure: optional_number(body, "pressure", &mut errors),
        wind_speed: optional_number(body, "windSpeed", &mut errors),
        wind_direction: optional_number(body, "windDirection", &mut errors),
    };

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}

fn record_from_observation(city: &str, obs: Observation) -> NewWeather {
    NewWeather {
        id: uuid::Uuid::new_v4().to_string(),
        city: city.to_string(),
        temperature: kelvin_to_celsius(obs.temperature_k),
        description: obs.description,
        humidity: obs.humidity,
        pressure: obs.pressure,
        wind_speed: obs.wind_speed,
        wind_direction: obs.wind_direction,
        created_at: now_rfc3339(),
    }
}

pub async fn create(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    if state.config.protect_weather_create
        && session::get_session(&cookies, &state.cookie_key).is_none()
    {
        return Err(ApiError::Unauthorized);
    }

    let input = validate_create(&body).map_err(ApiError::Validation)?;
    let rec = NewWeather {
        id: uuid::Uuid::new_v4().to_string(),
        city: input.city,
        temperature: input.temperature,
        description: input.description,
        humidity: input.humidity,
        pressure: input.pressure,
        wind_speed: input.wind_speed,
        wind_direction: input.wind_direction,
        created_at: now_rfc3339(),
    };

    match state.store.insert_weather(rec).await {
        Ok(Some(created)) => Ok((StatusCode::CREATED, Json(created)).into_response()),
        Ok(None) => Err(ApiError::Conflict(
            "Weather data for this city already exists.".to_string(),
        )),
        Err(e) => {
            tracing::error!(error = ?e, "failed to insert weather record");
            Err(ApiError::Internal("Error creating weather data".to_string()))
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.store.list_weather().await {
        Ok(rows) => Ok(Json(rows).into_response()),
        Err(e) => {
            tracing::error!(error = ?e, "failed to list weather records");
            Err(ApiError::Internal("Error fetching weather data".to_string()))
        }
    }
}

/// Authenticated variant of the list endpoint.
pub async fn list_secure(
    _user: SessionUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    list(State(state)).await
}

pub async fn get_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Response, ApiError> {
    let found = state.store.find_weather(&city).await.map_err(|e| {
        tracing::error!(error = ?e, %city, "failed to look up weather record");
        ApiError::Internal("Error fetching weather data".to_string())
    })?;
    if let Some(rec) = found {
        return Ok(Json(rec).into_response());
    }

    // Fetch-and-cache on miss when an upstream source is configured.
    let Some(source) = &state.weather_source else {
        return Err(ApiError::NotFound(
            "Weather data not found for this city".to_string(),
        ));
    };

    let obs = source.current(&city).await.map_err(|e| {
        tracing::error!(error = ?e, %city, "upstream weather fetch failed");
        ApiError::Internal("Error fetching weather data".to_string())
    })?;

    let rec = record_from_observation(&city, obs);
    let stored = state.store.insert_weather(rec).await.map_err(|e| {
        tracing::error!(error = ?e, %city, "failed to cache fetched weather");
        ApiError::Internal("Error fetching weather data".to_string())
    })?;

    match stored {
        Some(rec) => Ok(Json(rec).into_response()),
        // A concurrent miss won the insert; serve whatever it stored.
        None => match state.store.find_weather(&city).await {
            Ok(Some(rec)) => Ok(Json(rec).into_response()),
            Ok(None) => Err(ApiError::NotFound(
                "Weather data not found for this city".to_string(),
            )),
            Err(e) => {
                tracing::error!(error = ?e, %city, "failed to re-read cached weather");
                Err(ApiError::Internal("Error fetching weather data".to_string()))
            }
        },
    }
}

pub async fn update(
    _user: SessionUser,
    State(state): State<AppState>,
    Path(city): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let changes = validate_update(&body).map_err(ApiError::Validation)?;

    match state.store.update_weather(&city, changes).await {
        Ok(Some(rec)) => Ok(Json(rec).into_response()),
        Ok(None) => Err(ApiError::NotFound(
            "Weather data not found for this city".to_string(),
        )),
        Err(e) => {
            tracing::error!(error = ?e, %city, "failed to update weather record");
            Err(ApiError::Internal("Error updating weather data".to_string()))
        }
    }
}

pub async fn delete(
    _user: SessionUser,
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Response, ApiError> {
    match state.store.delete_weather(&city).await {
        Ok(Some(rec)) => Ok(Json(json!({
            "message": "Weather data deleted successfully",
            "data": rec,
        }))
        .into_response()),
        Ok(None) => Err(ApiError::NotFound(
            "No weather data found for this city to delete".to_string(),
        )),
        Err(e) => {
            tracing::error!(error = ?e, %city, "failed to delete weather record");
            Err(ApiError::Internal("Error deleting weather data".to_string()))
        }
    }
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::app::AppState;
use crate::models::location::{LocationChanges, NewLocation};
use crate::models::now_rfc3339;
use crate::web::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocation {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateLocation {
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// No duplicate check: several records may share a city.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateLocation>,
) -> Result<Response, ApiError> {
    let rec = NewLocation {
        id: uuid::Uuid::new_v4().to_string(),
        city: body.city,
        country: body.country,
        latitude: body.latitude,
        longitude: body.longitude,
        created_at: now_rfc3339(),
    };

    match state.store.insert_location(rec).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created)).into_response()),
        Err(e) => {
            tracing::error!(error = ?e, "failed to insert location");
            Err(ApiError::Internal("Failed to save location".to_string()))
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.store.list_locations().await {
        Ok(rows) => Ok(Json(rows).into_response()),
        Err(e) => {
            tracing::error!(error = ?e, "failed to list locations");
            Err(ApiError::Internal("Failed to fetch locations".to_string()))
        }
    }
}

pub async fn get_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Response, ApiError> {
    match state.store.find_location(&city).await {
        Ok(Some(rec)) => Ok(Json(rec).into_response()),
        Ok(None) => Err(ApiError::NotFound("Location not found".to_string())),
        Err(e) => {
            tracing::error!(error = ?e, %city, "failed to look up location");
            Err(ApiError::Internal("Failed to fetch location".to_string()))
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Json(body): Json<UpdateLocation>,
) -> Result<Response, ApiError> {
    let changes = LocationChanges {
        city: body.city,
        country: body.country,
        latitude: body.latitude,
        longitude: body.longitude,
    };

    match state.store.update_location(&city, changes).await {
        Ok(Some(rec)) => Ok(Json(rec).into_response()),
        Ok(None) => Err(ApiError::NotFound("Location not found".to_string())),
        Err(e) => {
            tracing::error!(error = ?e, %city, "failed to update location");
            Err(ApiError::Internal("Failed to update location".to_string()))
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Response, ApiError> {
    match state.store.delete_location(&city).await {
        Ok(Some(_)) => Ok(Json(json!({ "message": "Location deleted successfully" })).into_response()),
        Ok(None) => Err(ApiError::NotFound("Location not found".to_string())),
        Err(e) => {
            tracing::error!(error = ?e, %city, "failed to delete location");
            Err(ApiError::Internal("Failed to delete location".to_string()))
        }
    }
}

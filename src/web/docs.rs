use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::config::AppConfig;

/// Machine-readable API description, built once at startup. Written to
/// `openapi.json` as a side artifact and served at GET /api-docs; the core
/// handlers never consume it.
pub fn build_api_doc(config: &AppConfig) -> Value {
    let weather_schema = json!({
        "type": "object",
        "properties": {
            "city": { "type": "string" },
            "temperature": { "type": "number" },
            "description": { "type": "string" },
            "humidity": { "type": "number" },
            "pressure": { "type": "number" },
            "windSpeed": { "type": "number" },
            "windDirection": { "type": "number", "description": "degrees, 0 = north" }
        },
        "required": ["city", "temperature"]
    });
    let location_schema = json!({
        "type": "object",
        "properties": {
            "city": { "type": "string" },
            "country": { "type": "string" },
            "latitude": { "type": "number" },
            "longitude": { "type": "number" }
        },
        "required": ["city", "country", "latitude", "longitude"]
    });

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Weather API",
            "version": "1.0.0",
            "description": "API for weather and location data"
        },
        "servers": [{ "url": config.public_url }],
        "components": {
            "schemas": {
                "Weather": weather_schema,
                "Location": location_schema
            },
            "securitySchemes": {
                "OAuth2": {
                    "type": "oauth2",
                    "flows": {
                        "authorizationCode": {
                            "authorizationUrl": config.oauth.auth_url,
                            "tokenUrl": config.oauth.token_url,
                            "scopes": {}
                        }
                    }
                }
            }
        },
        "paths": {
            "/weather": {
                "post": { "summary": "Create weather data", "responses": { "201": {}, "400": {}, "500": {} } },
                "get": { "summary": "List all weather data", "responses": { "200": {}, "500": {} } }
            },
            "/weather/{city}": {
                "get": { "summary": "Get weather for a city", "responses": { "200": {}, "404": {}, "500": {} } }
            },
            "/weather/update/{city}": {
                "put": { "summary": "Update weather for a city", "security": [{ "OAuth2": [] }], "responses": { "200": {}, "401": {}, "404": {}, "500": {} } }
            },
            "/weather/delete/{city}": {
                "delete": { "summary": "Delete weather for a city", "security": [{ "OAuth2": [] }], "responses": { "200": {}, "401": {}, "404": {}, "500": {} } }
            },
            "/weather-data": {
                "get": { "summary": "List all weather data (authenticated)", "security": [{ "OAuth2": [] }], "responses": { "200": {}, "401": {}, "500": {} } }
            },
            "/api/location": {
                "post": { "summary": "Create a location", "responses": { "201": {}, "500": {} } },
                "get": { "summary": "List all locations", "responses": { "200": {}, "500": {} } }
            },
            "/api/location/{city}": {
                "get": { "summary": "Get a location by city", "responses": { "200": {}, "404": {}, "500": {} } },
                "put": { "summary": "Update a location by city", "responses": { "200": {}, "404": {}, "500": {} } },
                "delete": { "summary": "Delete a location by city", "responses": { "200": {}, "404": {}, "500": {} } }
            }
        }
    })
}

pub fn write_api_doc(doc: &Value, path: &str) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, body)?;
    Ok(())
}

pub async fn serve(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.api_doc.as_ref().clone())
}

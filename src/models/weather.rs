use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// One weather record per city. `wind_direction` is numeric degrees
/// (OpenWeather `wind.deg`), 0 = north.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::weather)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub id: String,
    pub city: String,
    pub temperature: f64,
    pub description: Option<String>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::weather)]
pub struct NewWeather {
    pub id: String,
    pub city: String,
    pub temperature: f64,
    pub description: Option<String>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub created_at: String,
}

/// Partial update; `None` fields are left untouched. The city key itself is
/// never updated through this path.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::weather)]
pub struct WeatherChanges {
    pub temperature: Option<f64>,
    pub description: Option<String>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
}

impl WeatherChanges {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.description.is_none()
            && self.humidity.is_none()
            && self.pressure.is_none()
            && self.wind_speed.is_none()
            && self.wind_direction.is_none()
    }
}

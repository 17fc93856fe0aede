use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Locations carry no uniqueness constraint; several records may share a
/// city and city lookups return the first match.
#[derive(Debug, Clone, Queryable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::locations)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub id: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::locations)]
pub struct NewLocation {
    pub id: String,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::locations)]
pub struct LocationChanges {
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationChanges {
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.country.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

use async_trait::async_trait;

use crate::models::{
    location::{LocationChanges, LocationRecord, NewLocation},
    user::{NewUser, User},
    weather::{NewWeather, WeatherChanges, WeatherRecord},
};

/// CRUD-by-city access to the weather and location collections plus the
/// lazily created user identities. Implementations must be safe for
/// concurrent use; keyed creates are conflict-safe at the storage level.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns `None` when a record for the same city already exists.
    async fn insert_weather(&self, rec: NewWeather) -> anyhow::Result<Option<WeatherRecord>>;
    async fn list_weather(&self) -> anyhow::Result<Vec<WeatherRecord>>;
    async fn find_weather(&self, city: &str) -> anyhow::Result<Option<WeatherRecord>>;
    async fn update_weather(
        &self,
        city: &str,
        changes: WeatherChanges,
    ) -> anyhow::Result<Option<WeatherRecord>>;
    /// Returns the removed record, or `None` when the city is unknown.
    async fn delete_weather(&self, city: &str) -> anyhow::Result<Option<WeatherRecord>>;

    async fn insert_location(&self, rec: NewLocation) -> anyhow::Result<LocationRecord>;
    async fn list_locations(&self) -> anyhow::Result<Vec<LocationRecord>>;
    async fn find_location(&self, city: &str) -> anyhow::Result<Option<LocationRecord>>;
    async fn update_location(
        &self,
        city: &str,
        changes: LocationChanges,
    ) -> anyhow::Result<Option<LocationRecord>>;
    async fn delete_location(&self, city: &str) -> anyhow::Result<Option<LocationRecord>>;

    /// Upsert keyed by `oauth_id`: the existing user wins, a concurrent
    /// duplicate insert is absorbed by the unique constraint.
    async fn find_or_create_user(&self, new_user: NewUser) -> anyhow::Result<User>;
}

pub mod sqlite;

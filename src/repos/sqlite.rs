use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::OptionalExtension;

use crate::db::DbPool;
use crate::models::{
    location::{LocationChanges, LocationRecord, NewLocation},
    user::{NewUser, User},
    weather::{NewWeather, WeatherChanges, WeatherRecord},
};
use crate::repos::Store;
use crate::schema::{locations, users, weather};

pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_weather(&self, rec: NewWeather) -> anyhow::Result<Option<WeatherRecord>> {
        let pool = self.pool.clone();
        let row = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<WeatherRecord>> {
            let mut conn = pool.get()?;
            let inserted = diesel::insert_into(weather::table)
                .values(&rec)
                .on_conflict(weather::city)
                .do_nothing()
                .execute(&mut conn)?;
            if inserted == 0 {
                return Ok(None);
            }
            let row = weather::table
                .find(&rec.id)
                .first::<WeatherRecord>(&mut conn)?;
            Ok(Some(row))
        })
        .await??;
        Ok(row)
    }

    async fn list_weather(&self) -> anyhow::Result<Vec<WeatherRecord>> {
        let pool = self.pool.clone();
        let rows = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<WeatherRecord>> {
            let mut conn = pool.get()?;
            let rows = weather::table
                .order(weather::created_at.asc())
                .load::<WeatherRecord>(&mut conn)?;
            Ok(rows)
        })
        .await??;
        Ok(rows)
    }

    async fn find_weather(&self, city: &str) -> anyhow::Result<Option<WeatherRecord>> {
        let city = city.to_string();
        let pool = self.pool.clone();
        let row = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<WeatherRecord>> {
            let mut conn = pool.get()?;
            let row = weather::table
                .filter(weather::city.eq(&city))
                .first::<WeatherRecord>(&mut conn)
                .optional()?;
            Ok(row)
        })
        .await??;
        Ok(row)
    }

    async fn update_weather(
        &self,
        city: &str,
        changes: WeatherChanges,
    ) -> anyhow::Result<Option<WeatherRecord>> {
        let city = city.to_string();
        let pool = self.pool.clone();
        let row = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<WeatherRecord>> {
            let mut conn = pool.get()?;
            conn.immediate_transaction(|conn| {
                let existing = weather::table
                    .filter(weather::city.eq(&city))
                    .first::<WeatherRecord>(conn)
                    .optional()?;
                let Some(existing) = existing else {
                    return Ok(None);
                };
                if changes.is_empty() {
                    // Diesel rejects an empty changeset
                    return Ok(Some(existing));
                }
                diesel::update(weather::table.filter(weather::city.eq(&city)))
                    .set(&changes)
                    .execute(conn)?;
                let updated = weather::table
                    .filter(weather::city.eq(&city))
                    .first::<WeatherRecord>(conn)?;
                Ok(Some(updated))
            })
        })
        .await??;
        Ok(row)
    }

    async fn delete_weather(&self, city: &str) -> anyhow::Result<Option<WeatherRecord>> {
        let city = city.to_string();
        let pool = self.pool.clone();
        let row = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<WeatherRecord>> {
            let mut conn = pool.get()?;
            conn.immediate_transaction(|conn| {
                let existing = weather::table
                    .filter(weather::city.eq(&city))
                    .first::<WeatherRecord>(conn)
                    .optional()?;
                if existing.is_some() {
                    diesel::delete(weather::table.filter(weather::city.eq(&city)))
                        .execute(conn)?;
                }
                Ok(existing)
            })
        })
        .await??;
        Ok(row)
    }

    async fn insert_location(&self, rec: NewLocation) -> anyhow::Result<LocationRecord> {
        let pool = self.pool.clone();
        let row = tokio::task::spawn_blocking(move || -> anyhow::Result<LocationRecord> {
            let mut conn = pool.get()?;
            diesel::insert_into(locations::table)
                .values(&rec)
                .execute(&mut conn)?;
            let row = locations::table
                .find(&rec.id)
                .first::<LocationRecord>(&mut conn)?;
            Ok(row)
        })
        .await??;
        Ok(row)
    }

    async fn list_locations(&self) -> anyhow::Result<Vec<LocationRecord>> {
        let pool = self.pool.clone();
        let rows = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<LocationRecord>> {
            let mut conn = pool.get()?;
            let rows = locations::table
                .order(locations::created_at.asc())
                .load::<LocationRecord>(&mut conn)?;
            Ok(rows)
        })
        .await??;
        Ok(rows)
    }

    async fn find_location(&self, city: &str) -> anyhow::Result<Option<LocationRecord>> {
        let city = city.to_string();
        let pool = self.pool.clone();
        let row = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<LocationRecord>> {
            let mut conn = pool.get()?;
            let row = locations::table
                .filter(locations::city.eq(&city))
                .order(locations::created_at.asc())
                .first::<LocationRecord>(&mut conn)
                .optional()?;
            Ok(row)
        })
        .await??;
        Ok(row)
    }

    async fn update_location(
        &self,
        city: &str,
        changes: LocationChanges,
    ) -> anyhow::Result<Option<LocationRecord>> {
        let city = city.to_string();
        let pool = self.pool.clone();
        let row = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<LocationRecord>> {
            let mut conn = pool.get()?;
            conn.immediate_transaction(|conn| {
                // Duplicates per city are allowed; mutate the first match only.
                let existing = locations::table
                    .filter(locations::city.eq(&city))
                    .order(locations::created_at.asc())
                    .first::<LocationRecord>(conn)
                    .optional()?;
                let Some(existing) = existing else {
                    return Ok(None);
                };
                if changes.is_empty() {
                    return Ok(Some(existing));
                }
                diesel::update(locations::table.find(&existing.id))
                    .set(&changes)
                    .execute(conn)?;
                let updated = locations::table
                    .find(&existing.id)
                    .first::<LocationRecord>(conn)?;
                Ok(Some(updated))
            })
        })
        .await??;
        Ok(row)
    }

    async fn delete_location(&self, city: &str) -> anyhow::Result<Option<LocationRecord>> {
        let city = city.to_string();
        let pool = self.pool.clone();
        let row = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<LocationRecord>> {
            let mut conn = pool.get()?;
            conn.immediate_transaction(|conn| {
                let existing = locations::table
                    .filter(locations::city.eq(&city))
                    .order(locations::created_at.asc())
                    .first::<LocationRecord>(conn)
                    .optional()?;
                if let Some(existing) = &existing {
                    diesel::delete(locations::table.find(&existing.id)).execute(conn)?;
                }
                Ok(existing)
            })
        })
        .await??;
        Ok(row)
    }

    async fn find_or_create_user(&self, new_user: NewUser) -> anyhow::Result<User> {
        let pool = self.pool.clone();
        let user = tokio::task::spawn_blocking(move || -> anyhow::Result<User> {
            let mut conn = pool.get()?;
            diesel::insert_into(users::table)
                .values(&new_user)
                .on_conflict(users::oauth_id)
                .do_nothing()
                .execute(&mut conn)?;
            let user = users::table
                .filter(users::oauth_id.eq(&new_user.oauth_id))
                .first::<User>(&mut conn)?;
            Ok(user)
        })
        .await??;
        Ok(user)
    }
}

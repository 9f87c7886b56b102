use chrono::Utc;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use super::{queries, DbPool};
use crate::models::trip::TripRow;
use crate::models::{NewTrip, TripRecord};

/// Persistent collection of trip records.
///
/// Scalar fields live in `trips`; the optional snapshot image lives in
/// `trip_snapshots` and is only read through [`TripStore::snapshot`].
#[derive(Debug, Clone)]
pub struct TripStore {
    pool: DbPool,
}

impl TripStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, trip: NewTrip) -> sqlx::Result<Uuid> {
        let trip_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(queries::INSERT_TRIP)
            .bind(trip_id)
            .bind(&trip.name)
            .bind(Utc::now().timestamp_micros())
            .bind(trip.rate_per_km)
            .bind(trip.distance_meters)
            .bind(trip.total_cost)
            .bind(trip.origin.lat)
            .bind(trip.origin.lon)
            .bind(trip.destination.lat)
            .bind(trip.destination.lon)
            .fetch_one(&mut *tx)
            .await?;
        let created_at_us: i64 = row.try_get("created_at_us")?;

        if let Some(image) = &trip.snapshot {
            sqlx::query(queries::INSERT_SNAPSHOT)
                .bind(trip_id)
                .bind(image)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            "Stored trip {} '{}' at {} (snapshot: {})",
            trip_id,
            trip.name,
            created_at_us,
            trip.snapshot.is_some()
        );
        Ok(trip_id)
    }

    /// All trips, newest first.
    pub async fn list(&self) -> sqlx::Result<Vec<TripRecord>> {
        self.stream().try_collect().await
    }

    /// Lazily reads trips, newest first. Each call re-queries the store.
    pub fn stream(&self) -> BoxStream<'_, sqlx::Result<TripRecord>> {
        sqlx::query_as::<_, TripRow>(queries::SELECT_TRIPS)
            .fetch(&self.pool)
            .map_ok(TripRecord::from)
            .boxed()
    }

    pub async fn get(&self, trip_id: Uuid) -> sqlx::Result<Option<TripRecord>> {
        let row = sqlx::query_as::<_, TripRow>(queries::SELECT_TRIP)
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(TripRecord::from))
    }

    pub async fn snapshot(&self, trip_id: Uuid) -> sqlx::Result<Option<Vec<u8>>> {
        let row = sqlx::query(queries::SELECT_SNAPSHOT)
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("image")?)),
            None => Ok(None),
        }
    }

    /// Removes a trip and its snapshot. Unknown ids are a no-op returning `false`.
    pub async fn delete(&self, trip_id: Uuid) -> sqlx::Result<bool> {
        Ok(self.delete_many(&[trip_id]).await? > 0)
    }

    /// Removes every listed trip in one transaction, by id.
    pub async fn delete_many(&self, trip_ids: &[Uuid]) -> sqlx::Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0;

        for trip_id in trip_ids {
            sqlx::query(queries::DELETE_SNAPSHOT)
                .bind(trip_id)
                .execute(&mut *tx)
                .await?;

            let result = sqlx::query(queries::DELETE_TRIP)
                .bind(trip_id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                debug!("Trip {} not found, nothing to delete", trip_id);
            }
            removed += result.rows_affected();
        }

        tx.commit().await?;
        info!("Deleted {} of {} requested trips", removed, trip_ids.len());
        Ok(removed)
    }
}

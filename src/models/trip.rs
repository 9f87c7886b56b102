use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::coordinate::Coordinate;

/// Stored trip. Immutable after creation; the snapshot image lives in a side
/// table and is fetched by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub rate_per_km: f64,
    pub distance_meters: f64,
    pub total_cost: f64,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub has_snapshot: bool,
}

/// Input to `TripStore::create`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub name: String,
    pub rate_per_km: f64,
    pub distance_meters: f64,
    pub total_cost: f64,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub snapshot: Option<Vec<u8>>,
}

#[derive(Debug, FromRow)]
pub(crate) struct TripRow {
    pub trip_id: Uuid,
    pub name: String,
    pub created_at_us: i64,
    pub rate_per_km: f64,
    pub distance_meters: f64,
    pub total_cost: f64,
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub dest_lat: f64,
    pub dest_lon: f64,
    pub has_snapshot: bool,
}

impl From<TripRow> for TripRecord {
    fn from(row: TripRow) -> Self {
        Self {
            id: row.trip_id,
            name: row.name,
            created_at: DateTime::from_timestamp_micros(row.created_at_us).unwrap_or_default(),
            rate_per_km: row.rate_per_km,
            distance_meters: row.distance_meters,
            total_cost: row.total_cost,
            origin: Coordinate::new(row.origin_lat, row.origin_lon),
            destination: Coordinate::new(row.dest_lat, row.dest_lon),
            has_snapshot: row.has_snapshot,
        }
    }
}

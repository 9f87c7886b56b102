pub const CREATE_TRIPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS trips (
    trip_id BLOB PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    created_at_us INTEGER NOT NULL,
    rate_per_km REAL NOT NULL,
    distance_meters REAL NOT NULL,
    total_cost REAL NOT NULL,
    origin_lat REAL NOT NULL,
    origin_lon REAL NOT NULL,
    dest_lat REAL NOT NULL,
    dest_lon REAL NOT NULL
);
"#;

pub const CREATE_TRIPS_CREATED_AT_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS trips_created_at_idx ON trips (created_at_us DESC);
"#;

pub const CREATE_SNAPSHOTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS trip_snapshots (
    trip_id BLOB PRIMARY KEY NOT NULL REFERENCES trips (trip_id) ON DELETE CASCADE,
    image BLOB NOT NULL
);
"#;

pub const SCHEMA: &[&str] = &[
    CREATE_TRIPS_TABLE,
    CREATE_TRIPS_CREATED_AT_INDEX,
    CREATE_SNAPSHOTS_TABLE,
];

// created_at is forced past the newest stored value so insertion order and
// time order never disagree, even if the clock steps backwards.
pub const INSERT_TRIP: &str = r#"
INSERT INTO trips (
    trip_id, name, created_at_us, rate_per_km, distance_meters, total_cost,
    origin_lat, origin_lon, dest_lat, dest_lon
) VALUES (
    $1, $2, MAX($3, COALESCE((SELECT MAX(created_at_us) FROM trips), 0) + 1),
    $4, $5, $6, $7, $8, $9, $10
)
RETURNING created_at_us;
"#;

pub const INSERT_SNAPSHOT: &str = r#"
INSERT INTO trip_snapshots (trip_id, image) VALUES ($1, $2);
"#;

pub const SELECT_TRIPS: &str = r#"
SELECT t.trip_id, t.name, t.created_at_us, t.rate_per_km, t.distance_meters, t.total_cost,
       t.origin_lat, t.origin_lon, t.dest_lat, t.dest_lon,
       EXISTS (SELECT 1 FROM trip_snapshots s WHERE s.trip_id = t.trip_id) AS has_snapshot
FROM trips t
ORDER BY t.created_at_us DESC;
"#;

pub const SELECT_TRIP: &str = r#"
SELECT t.trip_id, t.name, t.created_at_us, t.rate_per_km, t.distance_meters, t.total_cost,
       t.origin_lat, t.origin_lon, t.dest_lat, t.dest_lon,
       EXISTS (SELECT 1 FROM trip_snapshots s WHERE s.trip_id = t.trip_id) AS has_snapshot
FROM trips t
WHERE t.trip_id = $1;
"#;

pub const SELECT_SNAPSHOT: &str = r#"
SELECT image FROM trip_snapshots WHERE trip_id = $1;
"#;

pub const DELETE_SNAPSHOT: &str = r#"
DELETE FROM trip_snapshots WHERE trip_id = $1;
"#;

pub const DELETE_TRIP: &str = r#"
DELETE FROM trips WHERE trip_id = $1;
"#;

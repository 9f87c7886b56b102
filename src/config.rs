use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::cost::DEFAULT_RATE_PER_KM;
use crate::snapshot::PixelSize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub directions_url: String,
    pub snapshot_url: String,
    pub snapshot_width: u32,
    pub snapshot_height: u32,
    pub snapshot_scale: f64,
    pub navigation_url: String,
    pub default_rate_per_km: f64,
    pub http_timeout_secs: u64,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://trips.db".to_string());
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let directions_url = env::var("DIRECTIONS_URL")
            .unwrap_or_else(|_| "https://router.project-osrm.org".to_string());
        let snapshot_url = env::var("SNAPSHOT_URL")
            .unwrap_or_else(|_| "http://localhost:8080/staticmap".to_string());
        let snapshot_width = env::var("SNAPSHOT_WIDTH")
            .unwrap_or_else(|_| "800".to_string())
            .parse()
            .unwrap_or(800);
        let snapshot_height = env::var("SNAPSHOT_HEIGHT")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .unwrap_or(600);
        let snapshot_scale = env::var("SNAPSHOT_SCALE")
            .unwrap_or_else(|_| "2.0".to_string())
            .parse()
            .unwrap_or(2.0);
        let navigation_url = env::var("NAVIGATION_URL")
            .unwrap_or_else(|_| "https://www.google.com/maps/dir/".to_string());

        let default_rate_per_km = env::var("DEFAULT_RATE_PER_KM")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RATE_PER_KM);
        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            db_max_connections,
            directions_url,
            snapshot_url,
            snapshot_width,
            snapshot_height,
            snapshot_scale,
            navigation_url,
            default_rate_per_km,
            http_timeout_secs,
            log_level,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn snapshot_size(&self) -> PixelSize {
        PixelSize {
            width: self.snapshot_width,
            height: self.snapshot_height,
            scale: self.snapshot_scale,
        }
    }
}

mod config;
mod console;
mod cost;
mod db;
mod directions;
mod error;
mod location;
mod models;
mod navigation;
mod selection;
mod session;
mod snapshot;

use config::AppConfig;
use cost::Rate;
use directions::OsrmDirections;
use navigation::UrlNavigationLauncher;
use session::Session;
use snapshot::HttpSnapshotRenderer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging; stdout belongs to the console
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Trip Ledger...");

    // Init DB
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    info!("Opened trip store at {}", config.database_url);

    let directions = OsrmDirections::new(&config.directions_url, config.http_timeout())?;
    let renderer = HttpSnapshotRenderer::new(&config.snapshot_url, config.http_timeout())?;
    let launcher = UrlNavigationLauncher::new(&config.navigation_url)?;

    let rate = Rate::new(config.default_rate_per_km).unwrap_or_else(|| {
        warn!(
            "Ignoring default rate {}, using {}",
            config.default_rate_per_km,
            Rate::default().per_km()
        );
        Rate::default()
    });

    let (publisher, location) = location::channel();
    let session = Session::new(
        db::TripStore::new(pool),
        directions,
        renderer,
        Box::new(launcher),
        location,
    )
    .with_rate(rate)
    .with_snapshot_size(config.snapshot_size());

    console::run(session, publisher).await
}

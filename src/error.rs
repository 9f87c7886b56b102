use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no route available between the selected points")]
    Unavailable,
    #[error("invalid directions URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("directions request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid snapshot URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("snapshot request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("snapshot renderer returned an empty image")]
    Empty,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no resolved route to save")]
    NoRoute,
    #[error("another operation is in progress")]
    Busy,
    #[error("origin and destination must both be selected")]
    IncompleteSelection,
    #[error("no location received yet")]
    NoLocation,
    #[error("trip {0} not found")]
    NotFound(Uuid),
    #[error("trip {0} has no map snapshot")]
    NoSnapshot(Uuid),
    #[error("rate must be at least 0.01 per km, got {0}")]
    InvalidRate(f64),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

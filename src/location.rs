//! Latest-known device location.
//!
//! A location source pushes updates through [`LocationPublisher`]; consumers
//! read the most recent one from [`LocationCache`] without blocking.

use tokio::sync::watch;
use tracing::debug;

use crate::models::Coordinate;

pub fn channel() -> (LocationPublisher, LocationCache) {
    let (tx, rx) = watch::channel(None);
    (LocationPublisher { tx }, LocationCache { rx })
}

#[derive(Debug)]
pub struct LocationPublisher {
    tx: watch::Sender<Option<Coordinate>>,
}

impl LocationPublisher {
    pub fn publish(&self, coord: Coordinate) {
        debug!("Location update {}", coord);
        self.tx.send_replace(Some(coord));
    }
}

#[derive(Debug, Clone)]
pub struct LocationCache {
    rx: watch::Receiver<Option<Coordinate>>,
}

impl LocationCache {
    pub fn latest(&self) -> Option<Coordinate> {
        *self.rx.borrow()
    }
}

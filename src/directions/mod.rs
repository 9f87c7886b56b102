use std::future::Future;

use crate::error::RouteError;
use crate::models::{Coordinate, ResolvedRoute};

pub mod osrm;

pub use osrm::OsrmDirections;

/// External routing service. Implementations return the first candidate route.
pub trait DirectionsProvider: Send + Sync + 'static {
    fn resolve(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<ResolvedRoute, RouteError>> + Send;
}

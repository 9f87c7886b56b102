pub mod coordinate;
pub mod route;
pub mod trip;

pub use coordinate::{BoundingBox, Coordinate};
pub use route::ResolvedRoute;
pub use trip::{NewTrip, TripRecord};

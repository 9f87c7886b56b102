use super::coordinate::{BoundingBox, Coordinate};

/// First candidate returned by a directions provider. Transient, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub distance_meters: f64,
    pub polyline: Vec<Coordinate>,
    pub has_tolls: bool,
    pub name: String,
}

impl ResolvedRoute {
    /// Region covering the route geometry and both endpoints.
    pub fn region(&self, origin: Coordinate, destination: Coordinate) -> BoundingBox {
        let endpoints = [origin, destination];
        BoundingBox::enclosing(self.polyline.iter().chain(endpoints.iter()))
            .unwrap_or(BoundingBox {
                min_lat: origin.lat,
                min_lon: origin.lon,
                max_lat: origin.lat,
                max_lon: origin.lon,
            })
    }
}

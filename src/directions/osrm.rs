//! Directions over the OSRM HTTP route service.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use super::DirectionsProvider;
use crate::error::RouteError;
use crate::models::{Coordinate, ResolvedRoute};

const USER_AGENT: &str = concat!("trip-ledger/", env!("CARGO_PKG_VERSION"));
const TOLL_CLASS: &str = "toll";

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<RouteDto>,
}

#[derive(Debug, Deserialize)]
struct RouteDto {
    distance: f64,
    geometry: GeometryDto,
    #[serde(default)]
    legs: Vec<LegDto>,
}

#[derive(Debug, Deserialize)]
struct GeometryDto {
    /// GeoJSON order: `[lon, lat]`.
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct LegDto {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    steps: Vec<StepDto>,
}

#[derive(Debug, Deserialize)]
struct StepDto {
    #[serde(default)]
    intersections: Vec<IntersectionDto>,
}

#[derive(Debug, Deserialize)]
struct IntersectionDto {
    #[serde(default)]
    classes: Vec<String>,
}

impl From<RouteDto> for ResolvedRoute {
    fn from(route: RouteDto) -> Self {
        let has_tolls = route
            .legs
            .iter()
            .flat_map(|leg| &leg.steps)
            .flat_map(|step| &step.intersections)
            .any(|i| i.classes.iter().any(|c| c == TOLL_CLASS));

        let name = route
            .legs
            .iter()
            .map(|leg| leg.summary.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" / ");

        Self {
            distance_meters: route.distance,
            polyline: route
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| Coordinate::new(lat, lon))
                .collect(),
            has_tolls,
            name,
        }
    }
}

fn first_route(response: RouteResponse) -> Result<ResolvedRoute, RouteError> {
    if response.code != "Ok" {
        warn!(
            "Directions provider answered {}: {}",
            response.code,
            response.message.as_deref().unwrap_or("-")
        );
        return Err(RouteError::Unavailable);
    }

    response
        .routes
        .into_iter()
        .next()
        .map(ResolvedRoute::from)
        .ok_or(RouteError::Unavailable)
}

#[derive(Clone)]
pub struct OsrmDirections {
    http: Client,
    base_url: Url,
}

impl OsrmDirections {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, RouteError> {
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let base_url = Url::parse(&base)?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> Result<Url, RouteError> {
        let path = format!(
            "route/v1/driving/{},{};{},{}",
            origin.lon, origin.lat, destination.lon, destination.lat
        );
        let mut url = self.base_url.join(&path)?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson")
            .append_pair("steps", "true");
        Ok(url)
    }
}

impl DirectionsProvider for OsrmDirections {
    async fn resolve(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<ResolvedRoute, RouteError> {
        let url = self.route_url(origin, destination)?;
        debug!("Requesting route {}", url);

        // OSRM reports "no route" with a 400 and a JSON body, so the status
        // code is not checked before decoding.
        let response: RouteResponse = self.http.get(url).send().await?.json().await?;
        first_route(response)
    }
}

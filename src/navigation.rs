use reqwest::Url;
use tracing::info;

use crate::models::Coordinate;

/// Hands a pair of endpoints to an external turn-by-turn navigator.
pub trait NavigationLauncher: Send + Sync {
    fn open(&self, origin: Coordinate, destination: Coordinate);
}

/// Builds a driving-directions link for a maps web app and announces it.
#[derive(Debug, Clone)]
pub struct UrlNavigationLauncher {
    base_url: Url,
}

impl UrlNavigationLauncher {
    pub fn new(base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base)?,
        })
    }

    pub fn directions_url(&self, origin: Coordinate, destination: Coordinate) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("api", "1")
            .append_pair("origin", &format!("{},{}", origin.lat, origin.lon))
            .append_pair("destination", &format!("{},{}", destination.lat, destination.lon))
            .append_pair("travelmode", "driving");
        url
    }
}

impl NavigationLauncher for UrlNavigationLauncher {
    fn open(&self, origin: Coordinate, destination: Coordinate) {
        let url = self.directions_url(origin, destination);
        info!("Handing off navigation from {} to {}", origin, destination);
        println!("Open in your navigator: {}", url);
    }
}

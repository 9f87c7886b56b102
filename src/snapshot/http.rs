use std::time::Duration;

use reqwest::{Client, Url};
use tracing::debug;

use super::{PixelSize, SnapshotRenderer};
use crate::error::SnapshotError;
use crate::models::BoundingBox;

const USER_AGENT: &str = concat!("trip-ledger/", env!("CARGO_PKG_VERSION"));
const JPEG_QUALITY: u8 = 70;

#[derive(Clone)]
pub struct HttpSnapshotRenderer {
    http: Client,
    base_url: Url,
}

impl HttpSnapshotRenderer {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, SnapshotError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    fn snapshot_url(&self, region: BoundingBox, size: PixelSize) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair(
                "bbox",
                &format!(
                    "{},{},{},{}",
                    region.min_lon, region.min_lat, region.max_lon, region.max_lat
                ),
            )
            .append_pair("width", &size.width.to_string())
            .append_pair("height", &size.height.to_string())
            .append_pair("scale", &size.scale.to_string())
            .append_pair("format", "jpg")
            .append_pair("quality", &JPEG_QUALITY.to_string());
        url
    }
}

impl SnapshotRenderer for HttpSnapshotRenderer {
    async fn render(&self, region: BoundingBox, size: PixelSize) -> Result<Vec<u8>, SnapshotError> {
        let url = self.snapshot_url(region, size);
        debug!("Requesting snapshot {}", url);

        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        if bytes.is_empty() {
            return Err(SnapshotError::Empty);
        }
        Ok(bytes.to_vec())
    }
}

use std::future::Future;

use crate::error::SnapshotError;
use crate::models::BoundingBox;

pub mod http;

pub use http::HttpSnapshotRenderer;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Output dimensions of a rendered snapshot, in points times display scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

impl Default for PixelSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale: 1.0,
        }
    }
}

/// External static-map service returning encoded image bytes.
pub trait SnapshotRenderer: Send + Sync + 'static {
    fn render(
        &self,
        region: BoundingBox,
        size: PixelSize,
    ) -> impl Future<Output = Result<Vec<u8>, SnapshotError>> + Send;
}

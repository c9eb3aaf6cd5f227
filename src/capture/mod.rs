mod webcam;

pub use webcam::WebcamSource;

use anyhow::Result;
use image::RgbImage;

/// Trait for camera frame sources
pub trait FrameSource {
    /// Capture a single frame
    fn capture_frame(&mut self) -> Result<RgbImage>;

    /// Get the resolution of captured frames
    fn resolution(&self) -> (u32, u32);
}

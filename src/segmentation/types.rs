use anyhow::Result;
use image::RgbImage;

/// Per-pixel category labels for one frame, row-major: 1 = hair, 0 =
/// background. Regenerated every frame; never carried across iterations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    labels: Vec<u8>,
}

impl Mask {
    /// Wrap a label buffer. `labels` must hold exactly `width * height`
    /// entries.
    pub fn new(width: u32, height: u32, labels: Vec<u8>) -> Self {
        debug_assert_eq!(labels.len(), (width * height) as usize);
        Self {
            width,
            height,
            labels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }
}

/// Trait for segmentation models
/// Allows swapping between different backends (MediaPipe-style hair
/// segmenters, portrait models exported with class labels, etc.)
pub trait Segmenter {
    /// Process a frame and return a category mask with the frame's
    /// dimensions.
    fn segment(&mut self, frame: &RgbImage) -> Result<Mask>;

    /// Reset internal state. No-op for stateless models.
    fn reset(&mut self) {}

    /// The model's preferred input dimensions, (width, height).
    fn input_size(&self) -> (u32, u32);
}

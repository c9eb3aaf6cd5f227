use super::types::Mask;
use anyhow::Result;
use image::{imageops, GrayImage, Luma, RgbImage};
use ndarray::Array4;

/// Converts RGB frames to model input tensors and model labels back to
/// frame-sized masks.
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
        }
    }

    /// Preprocess an RGB image into a normalized NCHW tensor.
    ///
    /// Resizes to the model's input dimensions, scales each channel to
    /// [0, 1] and transposes HWC to NCHW.
    ///
    /// Returns: Array4<f32> with shape [1, 3, height, width]
    pub fn preprocess(&self, image: &RgbImage) -> Result<Array4<f32>> {
        let _span = tracing::debug_span!("preprocess").entered();

        let resized = if image.dimensions() != (self.target_width, self.target_height) {
            imageops::resize(
                image,
                self.target_width,
                self.target_height,
                imageops::FilterType::Lanczos3,
            )
        } else {
            image.clone()
        };

        let (width, height) = resized.dimensions();
        let mut tensor = Array4::<f32>::zeros((1, 3, height as usize, width as usize));

        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
            }
        }

        Ok(tensor)
    }

    /// Resize model-resolution labels back to frame dimensions.
    ///
    /// Nearest-neighbor on purpose: labels are categories, not intensities,
    /// and interpolation would invent values that are neither class.
    pub fn postprocess_labels(
        labels: &[u8],
        label_width: u32,
        label_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Result<Mask> {
        let _span = tracing::debug_span!("postprocess").entered();

        if label_width == target_width && label_height == target_height {
            return Ok(Mask::new(target_width, target_height, labels.to_vec()));
        }

        let gray = GrayImage::from_fn(label_width, label_height, |x, y| {
            let idx = (y * label_width + x) as usize;
            Luma([labels[idx]])
        });

        let resized = imageops::resize(
            &gray,
            target_width,
            target_height,
            imageops::FilterType::Nearest,
        );

        let labels: Vec<u8> = resized.pixels().map(|p| p[0]).collect();
        Ok(Mask::new(target_width, target_height, labels))
    }

    /// Render a mask as a black/white RGB image for `--show-mask`.
    pub fn mask_to_rgb(mask: &Mask) -> RgbImage {
        let width = mask.width();
        RgbImage::from_fn(width, mask.height(), |x, y| {
            let idx = (y * width + x) as usize;
            let v = if mask.labels()[idx] == 1 { 255 } else { 0 };
            image::Rgb([v, v, v])
        })
    }
}

use super::OutputSink;
use anyhow::{Context, Result};
use image::RgbImage;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Virtual camera sink over a v4l2loopback device.
///
/// v4l2loopback accepts raw YUYV frames written to the device file, so no
/// ioctl layer is needed here.
pub struct LoopbackOutput {
    file: File,
    width: u32,
    height: u32,
}

impl LoopbackOutput {
    pub fn new<P: AsRef<Path>>(device_path: P, width: u32, height: u32) -> Result<Self> {
        let path = device_path.as_ref();
        tracing::info!(
            "Opening v4l2loopback device at {} ({}x{})",
            path.display(),
            width,
            height
        );

        let file = File::options()
            .write(true)
            .open(path)
            .with_context(|| format!("Failed to open v4l2loopback device at {}", path.display()))?;

        tracing::info!("v4l2loopback device opened successfully");

        Ok(Self {
            file,
            width,
            height,
        })
    }
}

/// Pack an RGB frame into YUYV 4:2:2, the format v4l2loopback expects.
///
/// Chroma is averaged over each horizontal pixel pair; an odd trailing
/// column duplicates its pixel.
fn rgb_to_yuyv(rgb_image: &RgbImage) -> Vec<u8> {
    let (width, height) = rgb_image.dimensions();
    let mut yuyv = Vec::with_capacity((width * height * 2) as usize);

    for y in 0..height {
        for x in (0..width).step_by(2) {
            let pixel1 = rgb_image.get_pixel(x, y);
            let pixel2 = if x + 1 < width {
                rgb_image.get_pixel(x + 1, y)
            } else {
                pixel1
            };

            let (y1, u1, v1) = rgb_to_yuv(pixel1[0], pixel1[1], pixel1[2]);
            let (y2, u2, v2) = rgb_to_yuv(pixel2[0], pixel2[1], pixel2[2]);

            let u = ((u1 as u16 + u2 as u16) / 2) as u8;
            let v = ((v1 as u16 + v2 as u16) / 2) as u8;

            // YUYV layout: Y0 U Y1 V
            yuyv.push(y1);
            yuyv.push(u);
            yuyv.push(y2);
            yuyv.push(v);
        }
    }

    yuyv
}

/// Convert one RGB pixel to YUV (BT.601-ish coefficients).
fn rgb_to_yuv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as f32;
    let g = g as f32;
    let b = b as f32;

    let y = (0.299 * r + 0.587 * g + 0.114 * b).clamp(0.0, 255.0) as u8;
    let u = ((-0.147 * r - 0.289 * g + 0.436 * b) + 128.0).clamp(0.0, 255.0) as u8;
    let v = ((0.615 * r - 0.515 * g - 0.100 * b) + 128.0).clamp(0.0, 255.0) as u8;

    (y, u, v)
}

impl OutputSink for LoopbackOutput {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let frame = if frame.dimensions() != (self.width, self.height) {
            image::imageops::resize(
                frame,
                self.width,
                self.height,
                image::imageops::FilterType::Lanczos3,
            )
        } else {
            frame.clone()
        };

        let yuyv_data = rgb_to_yuyv(&frame);

        self.file
            .write_all(&yuyv_data)
            .context("Failed to write frame to v4l2loopback device")?;

        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn yuyv_is_two_bytes_per_pixel() {
        let frame = RgbImage::new(4, 3);
        assert_eq!(rgb_to_yuyv(&frame).len(), 4 * 3 * 2);
    }

    #[test]
    fn gray_pixel_has_neutral_chroma() {
        let (y, u, v) = rgb_to_yuv(128, 128, 128);
        assert_eq!(y, 128);
        assert_eq!(u, 128);
        assert_eq!(v, 128);
    }

    #[test]
    fn solid_frame_packs_uniform_macropixels() {
        let frame = RgbImage::from_pixel(2, 1, Rgb([255, 0, 0]));
        let packed = rgb_to_yuyv(&frame);
        let (y, u, v) = rgb_to_yuv(255, 0, 0);
        assert_eq!(packed, vec![y, u, y, v]);
    }
}

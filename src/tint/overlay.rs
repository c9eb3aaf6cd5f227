use super::blend::BlendMode;
use crate::segmentation::Mask;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use thiserror::Error;

/// Mask label treated as hair; everything else is background.
pub const HAIR_LABEL: u8 = 1;

#[derive(Debug, Error)]
pub enum TintError {
    #[error("dimension mismatch: frame is {frame_width}x{frame_height}, mask/overlay is {mask_width}x{mask_height}")]
    DimensionMismatch {
        frame_width: u32,
        frame_height: u32,
        mask_width: u32,
        mask_height: u32,
    },
}

/// Per-run tint settings, resolved once from the CLI.
#[derive(Clone, Copy, Debug)]
pub struct TintConfig {
    /// Fill color from the HSL controls
    pub color: [u8; 3],
    /// Global opacity in [0, 1]
    pub opacity: f32,
    pub blend: BlendMode,
    /// Edge-softening blur radius in pixels (overlay path only)
    pub feather: u32,
}

/// Build a transparent overlay from a hair mask.
///
/// Hair pixels become the fill color at full alpha, everything else is
/// fully transparent (0,0,0,0). The overlay has the mask's dimensions, so
/// the output buffer is always `width * height * 4` bytes.
pub fn mask_to_overlay(mask: &Mask, color: [u8; 3]) -> RgbaImage {
    let mut overlay = RgbaImage::new(mask.width(), mask.height());

    for (px, &label) in overlay.pixels_mut().zip(mask.labels()) {
        *px = if label == HAIR_LABEL {
            Rgba([color[0], color[1], color[2], 255])
        } else {
            Rgba([0, 0, 0, 0])
        };
    }

    overlay
}

/// Soften the overlay's edges with a box blur of the alpha plane.
///
/// Pixels whose alpha becomes non-zero take the fill color, so the feathered
/// fringe keeps the tint instead of bleeding black. Radius 0 is a no-op.
pub fn feather_alpha(overlay: &mut RgbaImage, color: [u8; 3], radius: u32) {
    if radius == 0 {
        return;
    }

    let width = overlay.width() as usize;
    let height = overlay.height() as usize;
    let alpha: Vec<u8> = overlay.pixels().map(|p| p[3]).collect();

    // Two box passes approximate a Gaussian well enough for an edge fringe
    let blurred = box_blur_plane(&alpha, width, height, radius as usize);
    let blurred = box_blur_plane(&blurred, width, height, radius as usize);

    for (px, a) in overlay.pixels_mut().zip(blurred) {
        *px = if a > 0 {
            Rgba([color[0], color[1], color[2], a])
        } else {
            Rgba([0, 0, 0, 0])
        };
    }
}

/// Separable box blur, horizontal then vertical, edges clamped.
fn box_blur_plane(plane: &[u8], width: usize, height: usize, radius: usize) -> Vec<u8> {
    let mut tmp = vec![0u8; plane.len()];
    let mut out = vec![0u8; plane.len()];

    for y in 0..height {
        let row = &plane[y * width..(y + 1) * width];
        blur_line(row, &mut tmp[y * width..(y + 1) * width], 1, width, radius);
    }
    for x in 0..width {
        blur_line(&tmp[x..], &mut out[x..], width, height, radius);
    }

    out
}

/// Blur one line of `len` samples spaced `stride` apart.
fn blur_line(src: &[u8], dst: &mut [u8], stride: usize, len: usize, radius: usize) {
    let window = (2 * radius + 1) as u32;
    let at = |i: isize| -> u32 {
        let i = i.clamp(0, len as isize - 1) as usize;
        src[i * stride] as u32
    };

    let mut sum: u32 = 0;
    for i in -(radius as isize)..=(radius as isize) {
        sum += at(i);
    }
    for i in 0..len {
        dst[i * stride] = (sum / window) as u8;
        sum += at(i as isize + radius as isize + 1);
        sum -= at(i as isize - radius as isize);
    }
}

/// Composite a (possibly feathered) overlay onto the frame.
///
/// Per pixel, the effective alpha is the overlay alpha scaled by the global
/// opacity; the result is `lerp(backdrop, blend(backdrop, color), alpha)`.
pub fn composite_overlay(
    frame: &mut RgbImage,
    overlay: &RgbaImage,
    opacity: f32,
    blend: BlendMode,
) -> Result<(), TintError> {
    if frame.dimensions() != overlay.dimensions() {
        return Err(TintError::DimensionMismatch {
            frame_width: frame.width(),
            frame_height: frame.height(),
            mask_width: overlay.width(),
            mask_height: overlay.height(),
        });
    }

    for (dst, src) in frame.pixels_mut().zip(overlay.pixels()) {
        let alpha = src[3] as f32 / 255.0 * opacity;
        if alpha <= 0.0 {
            continue;
        }
        *dst = blend_pixel(*dst, [src[0], src[1], src[2]], alpha, blend);
    }

    Ok(())
}

/// Direct-paint variant: walk the mask and blend the fill color straight
/// into hair pixels of the frame, no intermediate overlay. Feather does not
/// apply here.
pub fn paint_mask(frame: &mut RgbImage, mask: &Mask, config: &TintConfig) -> Result<(), TintError> {
    if frame.dimensions() != (mask.width(), mask.height()) {
        return Err(TintError::DimensionMismatch {
            frame_width: frame.width(),
            frame_height: frame.height(),
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }
    if config.opacity <= 0.0 {
        return Ok(());
    }

    for (dst, &label) in frame.pixels_mut().zip(mask.labels()) {
        if label == HAIR_LABEL {
            *dst = blend_pixel(*dst, config.color, config.opacity, config.blend);
        }
    }

    Ok(())
}

fn blend_pixel(backdrop: Rgb<u8>, color: [u8; 3], alpha: f32, blend: BlendMode) -> Rgb<u8> {
    let mut out = [0u8; 3];
    for c in 0..3 {
        let b = backdrop[c] as f32 / 255.0;
        let s = color[c] as f32 / 255.0;
        let blended = blend.apply(b, s).clamp(0.0, 1.0);
        let mixed = b + (blended - b) * alpha;
        out[c] = (mixed * 255.0).round() as u8;
    }
    Rgb(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_2x2(labels: [u8; 4]) -> Mask {
        Mask::new(2, 2, labels.to_vec())
    }

    #[test]
    fn overlay_bytes_match_mask() {
        let mask = mask_2x2([1, 0, 0, 1]);
        let overlay = mask_to_overlay(&mask, [10, 20, 30]);

        assert_eq!(
            overlay.into_raw(),
            vec![10, 20, 30, 255, 0, 0, 0, 0, 0, 0, 0, 0, 10, 20, 30, 255]
        );
    }

    #[test]
    fn overlay_buffer_length_is_4_per_pixel() {
        let mask = Mask::new(5, 3, vec![0; 15]);
        let overlay = mask_to_overlay(&mask, [1, 2, 3]);
        assert_eq!(overlay.into_raw().len(), 5 * 3 * 4);
    }

    #[test]
    fn non_hair_labels_stay_transparent() {
        // Only the exact hair label gets painted; other classes are background
        let mask = mask_2x2([2, 0, 255, 1]);
        let overlay = mask_to_overlay(&mask, [200, 100, 50]);
        assert_eq!(overlay.get_pixel(0, 0)[3], 0);
        assert_eq!(overlay.get_pixel(1, 0)[3], 0);
        assert_eq!(overlay.get_pixel(0, 1)[3], 0);
        assert_eq!(*overlay.get_pixel(1, 1), Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn feather_zero_is_noop() {
        let mask = mask_2x2([1, 0, 0, 1]);
        let mut overlay = mask_to_overlay(&mask, [10, 20, 30]);
        let before = overlay.clone();
        feather_alpha(&mut overlay, [10, 20, 30], 0);
        assert_eq!(overlay, before);
    }

    #[test]
    fn feather_spreads_alpha_into_background() {
        // Single hair pixel in the middle of a 5x5 field
        let mut labels = vec![0u8; 25];
        labels[12] = 1;
        let mask = Mask::new(5, 5, labels);
        let mut overlay = mask_to_overlay(&mask, [100, 0, 0]);
        feather_alpha(&mut overlay, [100, 0, 0], 1);

        let center = overlay.get_pixel(2, 2)[3];
        let neighbor = overlay.get_pixel(2, 1)[3];
        assert!(center < 255, "center should soften, got {center}");
        assert!(neighbor > 0, "alpha should bleed into neighbors");
        assert!(neighbor < center);
        // Bled pixels carry the fill color
        assert_eq!(overlay.get_pixel(2, 1)[0], 100);
        // Far corner stays fully transparent
        assert_eq!(overlay.get_pixel(4, 4)[3], 0);
    }

    #[test]
    fn feather_keeps_solid_interior_opaque() {
        let mask = Mask::new(7, 7, vec![1; 49]);
        let mut overlay = mask_to_overlay(&mask, [1, 2, 3]);
        feather_alpha(&mut overlay, [1, 2, 3], 2);
        assert_eq!(overlay.get_pixel(3, 3)[3], 255);
    }

    #[test]
    fn composite_normal_full_opacity_replaces_hair_pixels() {
        let mask = mask_2x2([1, 0, 0, 1]);
        let overlay = mask_to_overlay(&mask, [10, 20, 30]);
        let mut frame = RgbImage::from_pixel(2, 2, Rgb([200, 200, 200]));

        composite_overlay(&mut frame, &overlay, 1.0, BlendMode::Normal).unwrap();

        assert_eq!(*frame.get_pixel(0, 0), Rgb([10, 20, 30]));
        assert_eq!(*frame.get_pixel(1, 0), Rgb([200, 200, 200]));
        assert_eq!(*frame.get_pixel(0, 1), Rgb([200, 200, 200]));
        assert_eq!(*frame.get_pixel(1, 1), Rgb([10, 20, 30]));
    }

    #[test]
    fn composite_half_opacity_mixes() {
        let mask = mask_2x2([1, 0, 0, 0]);
        let overlay = mask_to_overlay(&mask, [0, 0, 0]);
        let mut frame = RgbImage::from_pixel(2, 2, Rgb([200, 200, 200]));

        composite_overlay(&mut frame, &overlay, 0.5, BlendMode::Normal).unwrap();

        assert_eq!(*frame.get_pixel(0, 0), Rgb([100, 100, 100]));
    }

    #[test]
    fn composite_multiply_darkens_hair_only() {
        let mask = mask_2x2([1, 0, 0, 0]);
        let overlay = mask_to_overlay(&mask, [128, 128, 128]);
        let mut frame = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));

        composite_overlay(&mut frame, &overlay, 1.0, BlendMode::Multiply).unwrap();

        assert_eq!(*frame.get_pixel(0, 0), Rgb([128, 128, 128]));
        assert_eq!(*frame.get_pixel(1, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn composite_rejects_mismatched_dimensions() {
        let mask = mask_2x2([1, 0, 0, 1]);
        let overlay = mask_to_overlay(&mask, [10, 20, 30]);
        let mut frame = RgbImage::new(3, 3);

        let err = composite_overlay(&mut frame, &overlay, 1.0, BlendMode::Normal).unwrap_err();
        assert!(matches!(err, TintError::DimensionMismatch { .. }));
    }

    #[test]
    fn paint_mask_matches_overlay_path_for_normal_blend() {
        let mask = mask_2x2([1, 0, 1, 0]);
        let config = TintConfig {
            color: [60, 70, 80],
            opacity: 0.75,
            blend: BlendMode::Normal,
            feather: 0,
        };

        let mut direct = RgbImage::from_pixel(2, 2, Rgb([40, 50, 60]));
        paint_mask(&mut direct, &mask, &config).unwrap();

        let mut via_overlay = RgbImage::from_pixel(2, 2, Rgb([40, 50, 60]));
        let overlay = mask_to_overlay(&mask, config.color);
        composite_overlay(&mut via_overlay, &overlay, config.opacity, config.blend).unwrap();

        assert_eq!(direct, via_overlay);
    }

    #[test]
    fn paint_mask_zero_opacity_leaves_frame() {
        let mask = mask_2x2([1, 1, 1, 1]);
        let config = TintConfig {
            color: [255, 0, 0],
            opacity: 0.0,
            blend: BlendMode::Normal,
            feather: 0,
        };
        let mut frame = RgbImage::from_pixel(2, 2, Rgb([9, 9, 9]));
        paint_mask(&mut frame, &mask, &config).unwrap();
        assert_eq!(*frame.get_pixel(0, 0), Rgb([9, 9, 9]));
    }

    #[test]
    fn paint_mask_rejects_mismatched_dimensions() {
        let mask = mask_2x2([1, 0, 0, 1]);
        let config = TintConfig {
            color: [1, 2, 3],
            opacity: 1.0,
            blend: BlendMode::Normal,
            feather: 0,
        };
        let mut frame = RgbImage::new(4, 4);
        assert!(paint_mask(&mut frame, &mask, &config).is_err());
    }
}

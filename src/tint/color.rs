/// Convert an HSL triple to 8-bit RGB.
///
/// # Arguments
/// * `h` - Hue in [0, 1), wrapping around the color wheel
/// * `s` - Saturation in [0, 1]
/// * `l` - Lightness in [0, 1]
///
/// Callers are expected to pre-clamp inputs. Saturation 0 degenerates to
/// gray, `r = g = b = round(l * 255)`.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return [v, v, v];
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    [
        (hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0).round() as u8,
        (hue_to_channel(p, q, h) * 255.0).round() as u8,
        (hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0).round() as u8,
    ]
}

/// One channel of the piecewise hue-sector formula.
fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Convert 8-bit RGB back to HSL, each component in [0, 1].
///
/// Achromatic inputs (r == g == b) return hue and saturation 0.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_saturation_is_gray() {
        for (l, expected) in [(0.0, 0u8), (0.25, 64), (0.5, 128), (1.0, 255)] {
            for h in [0.0, 0.3, 0.9] {
                assert_eq!(hsl_to_rgb(h, 0.0, l), [expected, expected, expected]);
            }
        }
    }

    #[test]
    fn primary_hues_fully_saturated() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0, 255, 0]);
        assert_eq!(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0, 0, 255]);
        // Secondary hues
        assert_eq!(hsl_to_rgb(1.0 / 6.0, 1.0, 0.5), [255, 255, 0]);
        assert_eq!(hsl_to_rgb(0.5, 1.0, 0.5), [0, 255, 255]);
        assert_eq!(hsl_to_rgb(5.0 / 6.0, 1.0, 0.5), [255, 0, 255]);
    }

    #[test]
    fn lightness_extremes() {
        assert_eq!(hsl_to_rgb(0.7, 1.0, 0.0), [0, 0, 0]);
        assert_eq!(hsl_to_rgb(0.7, 1.0, 1.0), [255, 255, 255]);
    }

    #[test]
    fn output_stays_in_range_across_domain() {
        // u8 can't leave [0, 255]; what we're really checking is that the
        // intermediate math never goes negative or above 1 and wraps on the
        // cast. Sample the domain and check the f64 channels directly.
        for hi in 0..=20 {
            for si in 0..=4 {
                for li in 0..=4 {
                    let h = hi as f64 / 20.0;
                    let s = si as f64 / 4.0;
                    let l = li as f64 / 4.0;
                    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
                    let p = 2.0 * l - q;
                    for t in [h + 1.0 / 3.0, h, h - 1.0 / 3.0] {
                        let c = hue_to_channel(p, q, t);
                        assert!((0.0..=1.0).contains(&c), "h={h} s={s} l={l}: {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn hsl_round_trips_through_rgb() {
        let (h, s, l) = rgb_to_hsl(180, 90, 45);
        let [r, g, b] = hsl_to_rgb(h, s, l);
        assert_eq!([r, g, b], [180, 90, 45]);
    }

    #[test]
    fn achromatic_rgb_has_no_hue() {
        assert_eq!(rgb_to_hsl(77, 77, 77), (0.0, 0.0, 77.0 / 255.0));
    }
}

use clap::ValueEnum;

/// How the tint color combines with the underlying frame pixel.
///
/// These mirror the common canvas/CSS composite operations. The blend is
/// applied per channel on values in [0, 1] before the opacity lerp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BlendMode {
    /// Source color replaces the backdrop (source-over)
    Normal,
    /// Darkens; white is neutral
    Multiply,
    /// Lightens; black is neutral
    Screen,
    /// Multiply in shadows, screen in highlights
    Overlay,
    /// Per-channel minimum
    Darken,
    /// Per-channel maximum
    Lighten,
}

impl BlendMode {
    /// Blend one source channel over a backdrop channel, both in [0, 1].
    pub fn apply(self, backdrop: f32, source: f32) -> f32 {
        match self {
            BlendMode::Normal => source,
            BlendMode::Multiply => backdrop * source,
            BlendMode::Screen => backdrop + source - backdrop * source,
            BlendMode::Overlay => {
                if backdrop <= 0.5 {
                    2.0 * backdrop * source
                } else {
                    1.0 - 2.0 * (1.0 - backdrop) * (1.0 - source)
                }
            }
            BlendMode::Darken => backdrop.min(source),
            BlendMode::Lighten => backdrop.max(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_ignores_backdrop() {
        assert_eq!(BlendMode::Normal.apply(0.9, 0.3), 0.3);
    }

    #[test]
    fn multiply_neutral_and_absorbing() {
        assert_eq!(BlendMode::Multiply.apply(0.4, 1.0), 0.4);
        assert_eq!(BlendMode::Multiply.apply(0.4, 0.0), 0.0);
    }

    #[test]
    fn screen_neutral_and_saturating() {
        assert_eq!(BlendMode::Screen.apply(0.4, 0.0), 0.4);
        assert_eq!(BlendMode::Screen.apply(0.4, 1.0), 1.0);
    }

    #[test]
    fn overlay_splits_at_midpoint() {
        // Dark backdrop multiplies, light backdrop screens
        assert_eq!(BlendMode::Overlay.apply(0.25, 0.5), 0.25);
        assert!((BlendMode::Overlay.apply(0.75, 0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn darken_lighten_pick_extremes() {
        assert_eq!(BlendMode::Darken.apply(0.2, 0.7), 0.2);
        assert_eq!(BlendMode::Lighten.apply(0.2, 0.7), 0.7);
    }
}

mod blend;
mod color;
mod overlay;

pub use blend::BlendMode;
pub use color::{hsl_to_rgb, rgb_to_hsl};
pub use overlay::{
    composite_overlay, feather_alpha, mask_to_overlay, paint_mask, TintConfig, TintError,
};

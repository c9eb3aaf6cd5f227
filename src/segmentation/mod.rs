mod hair;
mod preprocess;
pub mod types;

pub use hair::HairSegmenter;
pub use preprocess::Preprocessor;
pub use types::{Mask, Segmenter};

use anyhow::Result;

/// Create the default hair segmenter from an ONNX model file.
pub fn create_default_model(model_path: &str) -> Result<Box<dyn Segmenter>> {
    let model = HairSegmenter::new(model_path)?;
    Ok(Box::new(model))
}

use super::preprocess::Preprocessor;
use super::types::{Mask, Segmenter};
use anyhow::{bail, Context, Result};
use image::RgbImage;
use ndarray::IxDyn;
use ort::{GraphOptimizationLevel, Session};
use std::path::Path;

/// Hair segmentation model backed by an ONNX session.
///
/// Stateless per frame: no recurrent inputs, so `reset` keeps the trait's
/// no-op default. Handles two common export shapes:
/// - `[1, 1, H, W]`: hair confidence in [0, 1], thresholded
/// - `[1, 2, H, W]`: background/hair score map, argmax per pixel
pub struct HairSegmenter {
    session: Session,
    preprocessor: Preprocessor,
    width: u32,
    height: u32,
    threshold: f32,
}

impl HairSegmenter {
    /// Load a hair segmentation model from an ONNX file.
    ///
    /// Input is fixed at 512x512, the resolution the reference hair
    /// segmenter was trained at.
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let path = model_path.as_ref();

        tracing::info!("Loading hair segmentation model from {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!("Hair segmentation model loaded successfully");

        let width = 512;
        let height = 512;

        Ok(Self {
            session,
            preprocessor: Preprocessor::new(width, height),
            width,
            height,
            threshold: 0.5,
        })
    }
}

impl Segmenter for HairSegmenter {
    fn segment(&mut self, frame: &RgbImage) -> Result<Mask> {
        let _span = tracing::debug_span!("hair_segment").entered();

        let input_tensor = self.preprocessor.preprocess(frame)?;

        let _infer_span = tracing::debug_span!("inference").entered();
        let outputs = self
            .session
            .run(ort::inputs![input_tensor.view()]?)
            .context("Failed to run inference")?;
        drop(_infer_span);

        let scores = outputs[0]
            .try_extract_tensor::<f32>()?
            .view()
            .to_owned()
            .into_dimensionality::<IxDyn>()?;

        let shape = scores.shape();
        if shape.len() != 4 {
            bail!("unexpected model output rank {} (shape {:?})", shape.len(), shape);
        }
        let channels = shape[1];
        let out_height = shape[2];
        let out_width = shape[3];

        // Collapse scores to byte labels at model resolution
        let mut labels = Vec::with_capacity(out_width * out_height);
        for y in 0..out_height {
            for x in 0..out_width {
                let is_hair = match channels {
                    1 => scores[[0, 0, y, x]] >= self.threshold,
                    2 => scores[[0, 1, y, x]] > scores[[0, 0, y, x]],
                    n => bail!("unexpected model output channel count {n}"),
                };
                labels.push(u8::from(is_hair));
            }
        }

        let (frame_width, frame_height) = frame.dimensions();
        Preprocessor::postprocess_labels(
            &labels,
            out_width as u32,
            out_height as u32,
            frame_width,
            frame_height,
        )
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

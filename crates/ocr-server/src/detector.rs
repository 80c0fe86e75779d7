//! Textness network collaborator: a black-box CRAFT-style detector
//! producing a per-pixel textness heatmap. Abstracted behind a trait so the
//! handlers never depend on `ort` directly, matching the detector-trait
//! pattern used for neural-network black boxes elsewhere in the corpus.

use image::RgbImage;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;
use smart_crop_core::{Heatmap, ResizedFrame};

use crate::error::ServerError;

const MEAN: [f32; 3] = [123.68, 116.78, 103.94];

pub trait TextnessModel: Send + Sync {
    fn infer(&self, image: &RgbImage, resized: ResizedFrame) -> Result<Heatmap, ServerError>;
}

pub struct OrtTextnessModel {
    session: Session,
}

impl OrtTextnessModel {
    /// Loads the CRAFT ONNX model from `model_bytes` onto the CPU
    /// execution provider.
    pub fn load(model_bytes: &[u8]) -> Result<Self, ServerError> {
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_memory(model_bytes))
            .map_err(|e| ServerError::ModelUnavailable(format!("craft model load failed: {e}")))?;
        Ok(Self { session })
    }

    fn preprocess(image: &RgbImage, resized: ResizedFrame) -> Vec<f32> {
        let (w, h) = (resized.target_w as usize, resized.target_h as usize);
        let mut chw = vec![0f32; 3 * w * h];
        for y in 0..h.min(image.height() as usize) {
            for x in 0..w.min(image.width() as usize) {
                let px = image.get_pixel(x as u32, y as u32);
                for c in 0..3 {
                    let value = (px.0[c] as f32 - MEAN[c]) / 255.0;
                    chw[c * w * h + y * w + x] = value;
                }
            }
        }
        chw
    }
}

impl TextnessModel for OrtTextnessModel {
    fn infer(&self, image: &RgbImage, resized: ResizedFrame) -> Result<Heatmap, ServerError> {
        let (w, h) = (resized.target_w as usize, resized.target_h as usize);
        let chw = Self::preprocess(image, resized);

        let input = Tensor::from_array(([1usize, 3, h, w], chw))
            .map_err(|e| ServerError::ModelUnavailable(format!("tensor build failed: {e}")))?;

        let outputs = self
            .session
            .run(ort::inputs![input])
            .map_err(|e| ServerError::ModelUnavailable(format!("inference failed: {e}")))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ServerError::ModelUnavailable(format!("output extraction failed: {e}")))?;

        // Output is (1, C, H, W) or (1, H, W, C); channel 0 is the textness
        // score either way, just at a different stride.
        let channel_last = shape.len() == 4 && shape[3] < shape[1];
        let channels = if channel_last { shape[3] as usize } else { 1 };
        let mut heatmap_data = vec![0f32; w * h];
        for y in 0..h {
            for x in 0..w {
                let idx = if channel_last {
                    (y * w + x) * channels
                } else {
                    y * w + x
                };
                heatmap_data[y * w + x] = data.get(idx).copied().unwrap_or(0.0);
            }
        }

        Ok(Heatmap {
            width: resized.target_w,
            height: resized.target_h,
            data: heatmap_data,
        })
    }
}

//! Image decoding and tensor preparation

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use tract_onnx::prelude::tract_ndarray::Array4;

use crate::error::PredictError;

/// ImageNet channel means in BGR order, on the 0..255 scale
pub const CAFFE_MEAN_BGR: [f32; 3] = [103.939, 116.779, 123.68];

const TORCH_MEAN_RGB: [f32; 3] = [0.485, 0.456, 0.406];
const TORCH_STD_RGB: [f32; 3] = [0.229, 0.224, 0.225];

/// Channel normalization applied after resizing
///
/// These are the three conventions used by the Keras application families.
/// ResNet50 uses `Caffe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessMode {
    /// RGB to BGR, subtract per-channel ImageNet means, no scaling
    #[default]
    Caffe,
    /// Scale to [-1, 1]
    Tf,
    /// Scale to [0, 1], then standardize with ImageNet mean/std
    Torch,
}

impl PreprocessMode {
    /// Value of output channel `c` for an RGB pixel
    #[inline]
    fn apply(self, rgb: [u8; 3], c: usize) -> f32 {
        match self {
            PreprocessMode::Caffe => rgb[2 - c] as f32 - CAFFE_MEAN_BGR[c],
            PreprocessMode::Tf => rgb[c] as f32 / 127.5 - 1.0,
            PreprocessMode::Torch => (rgb[c] as f32 / 255.0 - TORCH_MEAN_RGB[c]) / TORCH_STD_RGB[c],
        }
    }
}

/// Turns encoded image bytes into a `(1, height, width, 3)` tensor
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    width: u32,
    height: u32,
    mode: PreprocessMode,
    filter: FilterType,
}

impl Preprocessor {
    pub fn new(height: u32, width: u32, mode: PreprocessMode) -> Self {
        Self {
            width,
            height,
            mode,
            filter: FilterType::CatmullRom,
        }
    }

    pub fn mode(&self) -> PreprocessMode {
        self.mode
    }

    /// Decode, resize (aspect ratio not kept) and normalize.
    pub fn prepare(&self, bytes: &[u8]) -> Result<Array4<f32>, PredictError> {
        if bytes.is_empty() {
            return Err(PredictError::EmptyInput);
        }

        let img = image::load_from_memory(bytes)?;
        let rgb = img.to_rgb8();
        let resized = imageops::resize(&rgb, self.width, self.height, self.filter);

        let mode = self.mode;
        let tensor = Array4::from_shape_fn(
            (1, self.height as usize, self.width as usize, 3),
            |(_, y, x, c)| mode.apply(resized.get_pixel(x as u32, y as u32).0, c),
        );
        Ok(tensor)
    }
}

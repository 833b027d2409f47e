//! Image preprocessing and ImageNet label decoding
//!
//! The two ends of a classification call: bytes to an NHWC tensor on the way
//! in, score vector to ranked labels on the way out.

mod labels;
mod preprocess;

pub use labels::{LabelTable, Prediction};
pub use preprocess::{PreprocessMode, Preprocessor, CAFFE_MEAN_BGR};

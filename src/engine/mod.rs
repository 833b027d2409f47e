//! Core inference engine
//!
//! - Runner: executes a loaded graph on a preprocessed tensor
//! - Classifier: preprocessing + runner + top-K decoding behind one call

mod classifier;
mod runner;

pub use classifier::Classifier;
pub use runner::{check_input_shape, OnnxRunner, Runner};

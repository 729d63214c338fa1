//! Prediction and inference
//!
//! Compose the schema registry with the deployed model and serve estimates.

pub mod inference;

pub use inference::Predictor;

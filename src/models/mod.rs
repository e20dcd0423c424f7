//! Model artifacts and inference

pub mod artifact;
pub mod inference;
pub mod loader;
pub mod onnx;

pub use artifact::{Classifier, ClassifierInput, FeatureMatrix, Label, Vectorizer};
pub use inference::InferenceEngine;
pub use loader::ModelLoader;
